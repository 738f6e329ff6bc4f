//! Report-only stylesheet linting.
//!
//! Sources are parsed in error-recovery mode and every recovered diagnostic
//! is reported through tracing. Findings never fail the pipeline.

use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use walkdir::WalkDir;

/// Outcome of a lint pass.
#[derive(Debug, Default)]
pub struct LintReport {
    /// Number of stylesheet files checked
    pub files: usize,

    /// Human-readable findings, one per diagnostic
    pub findings: Vec<String>,
}

/// Lint every `.css` file under `src_dir`.
pub fn lint_sources(src_dir: &Path) -> LintReport {
    let mut report = LintReport::default();

    for entry in WalkDir::new(src_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("css") {
            continue;
        }

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("Skipping unreadable {}: {}", path.display(), e);
                continue;
            }
        };

        report.files += 1;
        lint_one(path, &source, &mut report.findings);
    }

    for finding in &report.findings {
        tracing::warn!("{}", finding);
    }

    if report.findings.is_empty() {
        tracing::debug!("Lint clean: {} files", report.files);
    }

    report
}

fn lint_one(path: &Path, source: &str, findings: &mut Vec<String>) {
    let warnings = Arc::new(RwLock::new(Vec::new()));

    let options = ParserOptions {
        filename: path.display().to_string(),
        error_recovery: true,
        warnings: Some(warnings.clone()),
        ..ParserOptions::default()
    };

    if let Err(e) = StyleSheet::parse(source, options) {
        findings.push(format!("{}: {}", path.display(), e));
    }

    if let Ok(collected) = warnings.read() {
        for warning in collected.iter() {
            findings.push(format!("{}: {}", path.display(), warning));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn clean_sources_have_no_findings() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("button.css"),
            ".btn { color: red; padding: 4px; }\n",
        )
        .unwrap();

        let report = lint_sources(temp.path());

        assert_eq!(report.files, 1);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn reports_recovered_diagnostics() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("broken.css"),
            ".btn { color: }\n.ok { color: blue; }\n",
        )
        .unwrap();

        let report = lint_sources(temp.path());

        assert_eq!(report.files, 1);
        assert!(!report.findings.is_empty());
        assert!(report.findings[0].contains("broken.css"));
    }

    #[test]
    fn ignores_non_css_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("notes.txt"), "not a stylesheet").unwrap();

        let report = lint_sources(temp.path());

        assert_eq!(report.files, 0);
    }
}
