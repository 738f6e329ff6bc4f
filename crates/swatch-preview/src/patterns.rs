//! Pattern document loading.
//!
//! Patterns are documentation fragments kept in a multi-document YAML file
//! and passed opaquely to the preview template.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::generator::PreviewError;

/// Load every document from a multi-document YAML patterns file.
///
/// A missing or malformed file is fatal; empty documents are dropped.
pub fn load_patterns(path: &Path) -> Result<Vec<serde_yaml::Value>, PreviewError> {
    let text = fs::read_to_string(path).map_err(|e| PreviewError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut documents = Vec::new();

    for document in serde_yaml::Deserializer::from_str(&text) {
        let value =
            serde_yaml::Value::deserialize(document).map_err(|e| PreviewError::Patterns {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        if !value.is_null() {
            documents.push(value);
        }
    }

    Ok(documents)
}
