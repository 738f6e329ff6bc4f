//! Preview application script assembly.
//!
//! The preview app is a handful of ES modules with relative imports. They are
//! resolved into a dependency graph, emitted dependency-first, and wrapped in
//! a single IIFE. Modules share one scope; this is sized for the tool's own
//! preview application, not arbitrary JavaScript.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*import\s+(?:[\w$*{},\s]+?\s+from\s+)?["']([^"']+)["']\s*;?\s*$"#)
        .expect("Invalid import regex")
});

static EXPORT_LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*export\s*\{[^}]*\}\s*(?:from\s*["'][^"']+["'])?\s*;?\s*$"#)
        .expect("Invalid export list regex")
});

static EXPORT_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(\s*)export\s+(default\s+)?").expect("Invalid export decl regex")
});

/// Errors that can occur while assembling the preview script.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("Failed to read module {path}: {message}")]
    Read { path: String, message: String },

    #[error("Cannot resolve import '{specifier}' from {importer}")]
    Unresolved { specifier: String, importer: String },

    #[error("Bare import '{specifier}' in {importer} is not supported; use a relative path")]
    External { specifier: String, importer: String },

    #[error("Import cycle involving {path}")]
    Cycle { path: String },
}

/// A bundled preview application script.
#[derive(Debug)]
pub struct ScriptBundle {
    /// Final script source
    pub code: String,

    /// Number of modules included
    pub modules: usize,
}

/// Bundle the module graph rooted at `entry` into one script.
pub fn bundle_script(entry: &Path) -> Result<ScriptBundle, BundleError> {
    let mut graph: DiGraph<PathBuf, ()> = DiGraph::new();
    let mut ids: HashMap<PathBuf, NodeIndex> = HashMap::new();
    let mut sources: HashMap<PathBuf, String> = HashMap::new();

    add_module(entry, &mut graph, &mut ids, &mut sources)?;

    let order = toposort(&graph, None).map_err(|cycle| BundleError::Cycle {
        path: graph[cycle.node_id()].display().to_string(),
    })?;

    // Edges point importer -> imported, so dependencies come last; reverse
    // for dependency-first emission.
    let mut code = String::from("(function () {\n'use strict';\n\n");

    for id in order.iter().rev() {
        let path = &graph[*id];
        let source = &sources[path];

        code.push_str(&format!("// --- {} ---\n", module_label(path)));
        code.push_str(&strip_module_syntax(source));
        code.push('\n');
    }

    code.push_str("})();\n");

    Ok(ScriptBundle {
        code,
        modules: graph.node_count(),
    })
}

fn add_module(
    path: &Path,
    graph: &mut DiGraph<PathBuf, ()>,
    ids: &mut HashMap<PathBuf, NodeIndex>,
    sources: &mut HashMap<PathBuf, String>,
) -> Result<NodeIndex, BundleError> {
    let key = normalize(path);

    if let Some(&id) = ids.get(&key) {
        return Ok(id);
    }

    let source = fs::read_to_string(path).map_err(|e| BundleError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let id = graph.add_node(key.clone());
    ids.insert(key.clone(), id);

    let imports: Vec<String> = IMPORT_RE
        .captures_iter(&source)
        .map(|caps| caps[1].to_string())
        .collect();

    sources.insert(key.clone(), source);

    for specifier in imports {
        let target = resolve_import(&specifier, path)?;
        let child = add_module(&target, graph, ids, sources)?;
        graph.add_edge(id, child, ());
    }

    Ok(id)
}

/// Resolve a relative import specifier against the importing module.
fn resolve_import(specifier: &str, importer: &Path) -> Result<PathBuf, BundleError> {
    if !specifier.starts_with("./") && !specifier.starts_with("../") {
        return Err(BundleError::External {
            specifier: specifier.to_string(),
            importer: importer.display().to_string(),
        });
    }

    let dir = importer.parent().unwrap_or(Path::new("."));
    let mut resolved = dir.join(specifier);

    if resolved.extension().is_none() {
        resolved.set_extension("js");
    }

    if resolved.is_file() {
        Ok(resolved)
    } else {
        Err(BundleError::Unresolved {
            specifier: specifier.to_string(),
            importer: importer.display().to_string(),
        })
    }
}

/// Lexically normalize a path so the same module resolved through different
/// importers lands on one graph node.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for part in path.components() {
        match part {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(part);
                }
            }
            _ => normalized.push(part),
        }
    }

    normalized
}

fn module_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("module")
        .to_string()
}

/// Drop import statements and export keywords so the module bodies run in a
/// single shared scope.
fn strip_module_syntax(source: &str) -> String {
    let without_imports = IMPORT_RE.replace_all(source, "");
    let without_export_lists = EXPORT_LIST_RE.replace_all(&without_imports, "");
    EXPORT_DECL_RE
        .replace_all(&without_export_lists, "$1")
        .trim()
        .to_string()
}
