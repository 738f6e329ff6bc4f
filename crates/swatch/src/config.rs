//! Configuration file loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use swatch_css::pipeline::default_browsers;
use swatch_css::StyleConfig;
use swatch_preview::PreviewConfig;
use swatch_server::{DevServerConfig, WatchRules};

/// Configuration file structure (swatch.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    css: CssSection,
    #[serde(default)]
    preview: PreviewSection,
    #[serde(default)]
    serve: ServeSection,
}

#[derive(Debug, Deserialize)]
struct CssSection {
    #[serde(default = "default_src")]
    src: String,
    #[serde(default = "default_build")]
    build: String,
    #[serde(default = "default_mirror")]
    mirror: String,
    #[serde(default = "default_basename")]
    basename: String,
    /// Browserslist queries used for syntax lowering and prefixing
    browsers: Option<Vec<String>>,
    /// Directory `url(*.svg)` references resolve against
    inline_root: Option<String>,
    #[serde(default = "default_inline_max_bytes")]
    inline_max_bytes: u64,
}

#[derive(Debug, Deserialize)]
struct PreviewSection {
    #[serde(default = "default_preview_src")]
    src: String,
    #[serde(default = "default_template")]
    template: String,
    #[serde(default = "default_patterns")]
    patterns: String,
}

#[derive(Debug, Deserialize)]
struct ServeSection {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_host")]
    host: String,
}

fn default_src() -> String {
    "src".to_string()
}
fn default_build() -> String {
    "build".to_string()
}
fn default_mirror() -> String {
    "build/css".to_string()
}
fn default_basename() -> String {
    "components".to_string()
}
fn default_inline_max_bytes() -> u64 {
    16 * 1024
}
fn default_preview_src() -> String {
    "previewer-src".to_string()
}
fn default_template() -> String {
    "previewer-src/index.html.j2".to_string()
}
fn default_patterns() -> String {
    "patterns.yaml".to_string()
}
fn default_port() -> u16 {
    4321
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl Default for CssSection {
    fn default() -> Self {
        Self {
            src: default_src(),
            build: default_build(),
            mirror: default_mirror(),
            basename: default_basename(),
            browsers: None,
            inline_root: None,
            inline_max_bytes: default_inline_max_bytes(),
        }
    }
}

impl Default for PreviewSection {
    fn default() -> Self {
        Self {
            src: default_preview_src(),
            template: default_template(),
            patterns: default_patterns(),
        }
    }
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Resolved settings for every crate in the pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    pub style: StyleConfig,
    pub preview: PreviewConfig,
    pub server: DevServerConfig,
    pub watch: WatchRules,
}

/// Load settings from a swatch.toml file.
///
/// A missing file yields the defaults; an existing but malformed file is an
/// error.
pub fn load(path: &Path) -> Result<Settings> {
    let file = if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::debug!("Loaded config from {}", path.display());
        config
    } else {
        ConfigFile::default()
    };

    Ok(resolve(file))
}

fn resolve(file: ConfigFile) -> Settings {
    let src_dir = PathBuf::from(&file.css.src);
    let build_dir = PathBuf::from(&file.css.build);
    let preview_src = PathBuf::from(&file.preview.src);
    let patterns = PathBuf::from(&file.preview.patterns);

    let inline_root = file
        .css
        .inline_root
        .map(PathBuf::from)
        .unwrap_or_else(|| src_dir.join("components"));

    Settings {
        style: StyleConfig {
            src_dir: src_dir.clone(),
            build_dir: build_dir.clone(),
            mirror_dir: PathBuf::from(&file.css.mirror),
            basename: file.css.basename.clone(),
            browsers: file.css.browsers.unwrap_or_else(default_browsers),
            inline_root,
            inline_max_bytes: file.css.inline_max_bytes,
        },
        preview: PreviewConfig {
            src_dir: preview_src.clone(),
            template: PathBuf::from(&file.preview.template),
            patterns: patterns.clone(),
            build_dir: build_dir.clone(),
            basename: file.css.basename,
        },
        server: DevServerConfig {
            build_dir,
            port: file.serve.port,
            host: file.serve.host,
            open: false,
        },
        watch: WatchRules {
            style_dir: src_dir,
            preview_dir: preview_src,
            patterns,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().unwrap();

        let settings = load(&temp.path().join("swatch.toml")).unwrap();

        assert_eq!(settings.style.basename, "components");
        assert_eq!(settings.server.port, 4321);
        assert_eq!(settings.preview.patterns, PathBuf::from("patterns.yaml"));
        assert_eq!(settings.style.inline_root, PathBuf::from("src/components"));
    }

    #[test]
    fn file_overrides_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("swatch.toml");
        fs::write(
            &path,
            r#"
[css]
src = "styles"
basename = "kit"

[serve]
port = 9999
"#,
        )
        .unwrap();

        let settings = load(&path).unwrap();

        assert_eq!(settings.style.src_dir, PathBuf::from("styles"));
        assert_eq!(settings.style.basename, "kit");
        assert_eq!(settings.preview.basename, "kit");
        assert_eq!(settings.server.port, 9999);
        assert_eq!(settings.watch.style_dir, PathBuf::from("styles"));
        assert_eq!(settings.style.inline_root, PathBuf::from("styles/components"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("swatch.toml");
        fs::write(&path, "[css\nsrc = ").unwrap();

        assert!(load(&path).is_err());
    }
}
