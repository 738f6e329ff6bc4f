//! SVG data-URI inlining for compiled stylesheets.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::{Captures, Regex};

static SVG_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*['"]?([^'")]+\.svg)['"]?\s*\)"#).expect("Invalid svg url regex")
});

/// Replace `url(*.svg)` references with base64 data URIs.
///
/// Each reference is resolved against the roots in order; the first hit
/// wins. Absolute URLs, data URIs, unresolvable references, and files larger
/// than `max_bytes` are left untouched.
pub fn inline_svg_urls(css: &str, roots: &[&Path], max_bytes: u64) -> String {
    SVG_URL_RE
        .replace_all(css, |caps: &Captures| {
            let reference = &caps[1];

            if reference.contains("://") || reference.starts_with("data:") {
                return caps[0].to_string();
            }

            let Some(path) = resolve(reference, roots) else {
                tracing::warn!("Cannot inline missing asset '{}'", reference);
                return caps[0].to_string();
            };

            match fs::metadata(&path) {
                Ok(meta) if meta.len() <= max_bytes => {}
                _ => {
                    tracing::debug!("Not inlining {} (over size cap)", path.display());
                    return caps[0].to_string();
                }
            }

            match fs::read(&path) {
                Ok(bytes) => format!(
                    "url(\"data:image/svg+xml;base64,{}\")",
                    STANDARD.encode(bytes)
                ),
                Err(e) => {
                    tracing::warn!("Cannot inline {}: {}", path.display(), e);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

fn resolve(reference: &str, roots: &[&Path]) -> Option<PathBuf> {
    roots
        .iter()
        .map(|root| root.join(reference))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn inlines_small_svg() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("icon.svg"), "<svg/>").unwrap();

        let css = ".a { background: url('icon.svg'); }";
        let out = inline_svg_urls(css, &[temp.path()], 1024);

        assert!(out.contains("data:image/svg+xml;base64,"));
        assert!(out.contains(&STANDARD.encode("<svg/>")));
    }

    #[test]
    fn later_roots_are_fallbacks() {
        let temp = tempdir().unwrap();
        let assets = temp.path().join("assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("icon.svg"), "<svg/>").unwrap();

        let css = ".a { background: url(icon.svg); }";
        let out = inline_svg_urls(css, &[temp.path(), &assets], 1024);

        assert!(out.contains("data:image/svg+xml;base64,"));
    }

    #[test]
    fn leaves_missing_files_alone() {
        let temp = tempdir().unwrap();

        let css = ".a { background: url(gone.svg); }";
        let out = inline_svg_urls(css, &[temp.path()], 1024);

        assert_eq!(out, css);
    }

    #[test]
    fn respects_size_cap() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("big.svg"), "x".repeat(2048)).unwrap();

        let css = ".a { background: url(big.svg); }";
        let out = inline_svg_urls(css, &[temp.path()], 1024);

        assert_eq!(out, css);
    }

    #[test]
    fn skips_remote_and_data_urls() {
        let temp = tempdir().unwrap();

        let css = ".a { background: url(https://example.com/x.svg); }";
        assert_eq!(inline_svg_urls(css, &[temp.path()], 1024), css);
    }

    #[test]
    fn ignores_non_svg_urls() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("photo.png"), [0u8; 4]).unwrap();

        let css = ".a { background: url(photo.png); }";
        assert_eq!(inline_svg_urls(css, &[temp.path()], 1024), css);
    }
}
