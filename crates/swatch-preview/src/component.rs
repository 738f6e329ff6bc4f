//! Component annotation extraction from compiled stylesheets.
//!
//! A component is declared by a comment block whose first content line starts
//! with the `~` sentinel. The line names the component; the rest of the block
//! is a YAML annotation bag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentinel character introducing a documentation block.
pub const SENTINEL: char = '~';

/// A documented component extracted from a compiled stylesheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// Identifying name from the sentinel line
    pub id: String,

    /// Parsed annotation bag
    pub annotation: Annotation,
}

/// The YAML annotation attached to a component declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Annotation {
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Grouping category for the preview page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Example HTML snippet rendered in the preview
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,

    /// Any further annotation keys, passed through to the template
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Errors that can occur while extracting components.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("Invalid annotation for component '{id}': {message}")]
    InvalidAnnotation { id: String, message: String },
}

/// Parse a compiled stylesheet into its ordered component list.
///
/// A stylesheet without documentation blocks yields an empty list, not an
/// error.
pub fn parse_components(css: &str) -> Result<Vec<Component>, ComponentError> {
    let mut components = Vec::new();

    for block in comment_blocks(css) {
        let Some((id, yaml)) = split_annotation(&block) else {
            continue;
        };

        let annotation = if yaml.trim().is_empty() {
            Annotation::default()
        } else {
            serde_yaml::from_str(&yaml).map_err(|e| ComponentError::InvalidAnnotation {
                id: id.clone(),
                message: e.to_string(),
            })?
        };

        components.push(Component { id, annotation });
    }

    Ok(components)
}

/// The contents of every `/* ... */` block, in document order.
fn comment_blocks(css: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut rest = css;

    while let Some(start) = rest.find("/*") {
        let body = &rest[start + 2..];
        let Some(end) = body.find("*/") else {
            break;
        };

        blocks.push(body[..end].to_string());
        rest = &body[end + 2..];
    }

    blocks
}

/// Split a comment body into the sentinel id and the annotation YAML.
///
/// Returns `None` for comment blocks that are not component declarations.
fn split_annotation(body: &str) -> Option<(String, String)> {
    let mut lines = body.lines();

    let id_line = loop {
        let line = lines.next()?;
        if !line.trim().is_empty() {
            break line.trim();
        }
    };

    let id = id_line.strip_prefix(SENTINEL)?.trim().to_string();
    if id.is_empty() {
        return None;
    }

    let remainder: Vec<&str> = lines.collect();
    Some((id, dedent(&remainder)))
}

/// Strip the common leading indentation so nested YAML parses cleanly.
fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| if line.len() >= indent { &line[indent..] } else { line.trim_start() })
        .collect::<Vec<_>>()
        .join("\n")
}
