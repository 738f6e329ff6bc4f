//! Artifact minification.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::Targets;

use crate::pipeline::StyleError;

/// Minify a compiled stylesheet.
pub fn minify_source(css: &str, filename: &str, targets: Targets) -> Result<String, StyleError> {
    let options = ParserOptions {
        filename: filename.to_string(),
        error_recovery: true,
        ..ParserOptions::default()
    };

    let mut stylesheet = StyleSheet::parse(css, options).map_err(|e| StyleError::Minify {
        path: filename.to_string(),
        message: e.to_string(),
    })?;

    stylesheet
        .minify(MinifyOptions {
            targets: targets.clone(),
            ..MinifyOptions::default()
        })
        .map_err(|e| StyleError::Minify {
            path: filename.to_string(),
            message: e.to_string(),
        })?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| StyleError::Minify {
            path: filename.to_string(),
            message: e.to_string(),
        })?;

    Ok(result.code)
}
