//! Style pipeline orchestration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use lightningcss::targets::{Browsers, Targets};

use crate::lint::lint_sources;
use crate::minify::minify_source;
use crate::transform::transform_entry;

/// Configuration for the style pipeline.
#[derive(Debug, Clone)]
pub struct StyleConfig {
    /// Stylesheet source tree
    pub src_dir: PathBuf,

    /// Flat build output directory
    pub build_dir: PathBuf,

    /// Consumer-layout mirror directory (second copy of every artifact)
    pub mirror_dir: PathBuf,

    /// Bundle base name; entries are `<basename>.css` and `*-<basename>.css`
    pub basename: String,

    /// Browserslist queries used for syntax lowering and prefixing
    pub browsers: Vec<String>,

    /// Directory that `url(*.svg)` references resolve against
    pub inline_root: PathBuf,

    /// Inline `url(*.svg)` references only up to this size
    pub inline_max_bytes: u64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            build_dir: PathBuf::from("build"),
            mirror_dir: PathBuf::from("build/css"),
            basename: "components".to_string(),
            browsers: default_browsers(),
            inline_root: PathBuf::from("src/components"),
            inline_max_bytes: 16 * 1024,
        }
    }
}

/// Browser support matrix applied when no explicit queries are configured.
pub fn default_browsers() -> Vec<String> {
    [
        "> 1%",
        "Firefox ESR",
        "Android >= 4.4",
        "iOS >= 8.0",
        "Chrome >= 30",
        "Safari >= 9",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Result of a full pipeline run.
#[derive(Debug)]
pub struct StyleReport {
    /// Number of entry stylesheets transformed
    pub entries: usize,

    /// Artifacts written to the build directory (non-minified)
    pub artifacts: Vec<PathBuf>,

    /// Number of lint findings reported
    pub lint_findings: usize,

    /// Total pipeline time in milliseconds
    pub duration_ms: u64,
}

/// Errors that can occur in the style pipeline.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Invalid browser targets: {0}")]
    Targets(String),

    #[error("CSS transform error in {path}: {message}")]
    Transform { path: String, message: String },

    #[error("CSS minify error in {path}: {message}")]
    Minify { path: String, message: String },
}

/// The clean -> lint -> transform -> minify pipeline.
pub struct StylePipeline {
    config: StyleConfig,
}

impl StylePipeline {
    /// Create a pipeline for the given configuration.
    pub fn new(config: StyleConfig) -> Self {
        Self { config }
    }

    /// Access the pipeline configuration.
    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    /// Run the full pipeline in fixed order.
    pub fn build(&self) -> Result<StyleReport, StyleError> {
        let start = Instant::now();

        self.clean()?;
        let lint = self.lint();
        let entries = self.transform()?;
        self.minify()?;

        Ok(StyleReport {
            entries,
            artifacts: self.built_artifacts(),
            lint_findings: lint.findings.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Remove previous bundle artifacts from both output directories.
    pub fn clean(&self) -> Result<(), StyleError> {
        for dir in [&self.config.build_dir, &self.config.mirror_dir] {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };

            for entry in entries.filter_map(|e| e.ok()) {
                let name = entry.file_name();
                let Some(name) = name.to_str() else { continue };

                if is_bundle_artifact(name, &self.config.basename) {
                    fs::remove_file(entry.path()).map_err(|e| StyleError::Write {
                        path: entry.path().display().to_string(),
                        message: e.to_string(),
                    })?;
                    tracing::debug!("Removed {}", entry.path().display());
                }
            }
        }

        Ok(())
    }

    /// Lint the source tree. Report-only: findings are logged, never fatal.
    pub fn lint(&self) -> crate::lint::LintReport {
        lint_sources(&self.config.src_dir)
    }

    /// Transform every entry stylesheet.
    ///
    /// Transform diagnostics are logged per entry without aborting the run;
    /// filesystem failures writing the output are fatal. Returns the number
    /// of entries successfully transformed.
    pub fn transform(&self) -> Result<usize, StyleError> {
        let entries = self.discover_entries()?;
        if entries.is_empty() {
            tracing::warn!(
                "No entry stylesheets matching {{*-,}}{}.css in {}",
                self.config.basename,
                self.config.src_dir.display()
            );
            return Ok(0);
        }

        let targets = self.targets()?;
        let mut transformed = 0;

        for entry in &entries {
            let css = match transform_entry(&self.config, entry, targets.clone()) {
                Ok(css) => css,
                Err(e) => {
                    // Best-effort policy: a broken entry must not stop the rest.
                    tracing::error!("{}", e);
                    continue;
                }
            };

            self.write_artifact(entry, &css)?;
            transformed += 1;
        }

        Ok(transformed)
    }

    /// Minify every built artifact to a `.min.css` sibling.
    pub fn minify(&self) -> Result<(), StyleError> {
        let targets = self.targets()?;

        for path in self.built_artifacts() {
            let css = fs::read_to_string(&path).map_err(|e| StyleError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

            let minified = minify_source(&css, &path.display().to_string(), targets.clone())?;

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&self.config.basename);
            let file_name = format!("{}.min.css", stem);

            for dir in [&self.config.build_dir, &self.config.mirror_dir] {
                let out = dir.join(&file_name);
                fs::write(&out, &minified).map_err(|e| StyleError::Write {
                    path: out.display().to_string(),
                    message: e.to_string(),
                })?;
            }

            tracing::debug!("Minified {}", file_name);
        }

        Ok(())
    }

    /// Entry stylesheets directly under the source directory, sorted.
    pub fn discover_entries(&self) -> Result<Vec<PathBuf>, StyleError> {
        let entries = fs::read_dir(&self.config.src_dir).map_err(|e| StyleError::Read {
            path: self.config.src_dir.display().to_string(),
            message: e.to_string(),
        })?;

        let mut found: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .is_some_and(|name| is_bundle_entry(name, &self.config.basename))
            })
            .map(|e| e.path())
            .collect();

        found.sort();
        Ok(found)
    }

    /// Non-minified artifacts currently present in the build directory, sorted.
    pub fn built_artifacts(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.config.build_dir) else {
            return Vec::new();
        };

        let mut found: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .is_some_and(|name| is_bundle_entry(name, &self.config.basename))
            })
            .map(|e| e.path())
            .collect();

        found.sort();
        found
    }

    fn targets(&self) -> Result<Targets, StyleError> {
        let browsers = Browsers::from_browserslist(self.config.browsers.iter().map(|s| s.as_str()))
            .map_err(|e| StyleError::Targets(e.to_string()))?;

        Ok(Targets {
            browsers,
            ..Targets::default()
        })
    }

    fn write_artifact(&self, entry: &Path, css: &str) -> Result<(), StyleError> {
        let file_name = entry
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("components.css")
            .to_string();

        for dir in [&self.config.build_dir, &self.config.mirror_dir] {
            fs::create_dir_all(dir).map_err(|e| StyleError::Write {
                path: dir.display().to_string(),
                message: e.to_string(),
            })?;

            let out = dir.join(&file_name);
            fs::write(&out, css).map_err(|e| StyleError::Write {
                path: out.display().to_string(),
                message: e.to_string(),
            })?;
        }

        tracing::debug!("Built {}", file_name);
        Ok(())
    }
}

/// Whether a file name is a bundle entry (`<basename>.css` or
/// `*-<basename>.css`, not minified).
pub(crate) fn is_bundle_entry(file_name: &str, basename: &str) -> bool {
    let plain = format!("{}.css", basename);
    file_name == plain || file_name.ends_with(&format!("-{}", plain))
}

/// Whether a file name is any bundle artifact, minified variants included.
pub(crate) fn is_bundle_artifact(file_name: &str, basename: &str) -> bool {
    is_bundle_entry(file_name, basename) || {
        let min = format!("{}.min.css", basename);
        file_name == min || file_name.ends_with(&format!("-{}", min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn config_in(root: &Path) -> StyleConfig {
        StyleConfig {
            src_dir: root.join("src"),
            build_dir: root.join("build"),
            mirror_dir: root.join("build/css"),
            inline_root: root.join("src/components"),
            ..StyleConfig::default()
        }
    }

    #[test]
    fn matches_bundle_entries() {
        assert!(is_bundle_entry("components.css", "components"));
        assert!(is_bundle_entry("dark-components.css", "components"));
        assert!(!is_bundle_entry("components.min.css", "components"));
        assert!(!is_bundle_entry("reset.css", "components"));
        assert!(!is_bundle_entry("componentsx.css", "components"));
    }

    #[test]
    fn matches_bundle_artifacts() {
        assert!(is_bundle_artifact("components.css", "components"));
        assert!(is_bundle_artifact("components.min.css", "components"));
        assert!(is_bundle_artifact("dark-components.min.css", "components"));
        assert!(!is_bundle_artifact("preview.css", "components"));
    }

    #[test]
    fn clean_removes_only_bundle_artifacts() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(&config.build_dir).unwrap();

        fs::write(config.build_dir.join("components.css"), "").unwrap();
        fs::write(config.build_dir.join("components.min.css"), "").unwrap();
        fs::write(config.build_dir.join("index.html"), "").unwrap();

        StylePipeline::new(config.clone()).clean().unwrap();

        assert!(!config.build_dir.join("components.css").exists());
        assert!(!config.build_dir.join("components.min.css").exists());
        assert!(config.build_dir.join("index.html").exists());
    }

    #[test]
    fn builds_entry_with_imports_into_both_directories() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(config.src_dir.join("components")).unwrap();

        fs::write(
            config.src_dir.join("components/button.css"),
            ".btn { color: red; }\n",
        )
        .unwrap();
        fs::write(
            config.src_dir.join("components.css"),
            "@import \"components/button.css\";\n",
        )
        .unwrap();

        let report = StylePipeline::new(config.clone()).build().unwrap();

        assert_eq!(report.entries, 1);

        let built = fs::read_to_string(config.build_dir.join("components.css")).unwrap();
        assert!(built.contains(".btn"));
        assert!(!built.contains("@import"));

        let mirrored = fs::read_to_string(config.mirror_dir.join("components.css")).unwrap();
        assert_eq!(built, mirrored);

        assert!(config.build_dir.join("components.min.css").exists());
        assert!(config.mirror_dir.join("components.min.css").exists());
    }

    #[test]
    fn broken_entry_does_not_stop_the_others() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(&config.src_dir).unwrap();

        // Unresolvable import: this entry fails to bundle.
        fs::write(
            config.src_dir.join("components.css"),
            "@import \"missing.css\";\n",
        )
        .unwrap();
        fs::write(
            config.src_dir.join("dark-components.css"),
            ".btn { color: black; }\n",
        )
        .unwrap();

        let pipeline = StylePipeline::new(config.clone());
        let transformed = pipeline.transform().unwrap();

        assert_eq!(transformed, 1);
        assert!(config.build_dir.join("dark-components.css").exists());
        assert!(!config.build_dir.join("components.css").exists());
    }

    #[test]
    fn discovers_entries_sorted() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(&config.src_dir).unwrap();

        fs::write(config.src_dir.join("components.css"), "").unwrap();
        fs::write(config.src_dir.join("dark-components.css"), "").unwrap();
        fs::write(config.src_dir.join("notes.txt"), "").unwrap();

        let entries = StylePipeline::new(config).discover_entries().unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["components.css", "dark-components.css"]);
    }
}
