//! Static preview asset copying.

use std::fs;
use std::path::Path;

use crate::generator::PreviewError;

/// Copy the preview application's static assets (`*.svg`, `*.css`) from the
/// preview source directory into the build directory.
///
/// Returns the number of files copied.
pub fn copy_preview_assets(src_dir: &Path, build_dir: &Path) -> Result<usize, PreviewError> {
    fs::create_dir_all(build_dir).map_err(|e| PreviewError::Write {
        path: build_dir.display().to_string(),
        message: e.to_string(),
    })?;

    let entries = fs::read_dir(src_dir).map_err(|e| PreviewError::Read {
        path: src_dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut copied = 0;

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != "svg" && ext != "css" {
            continue;
        }

        let Some(file_name) = path.file_name() else {
            continue;
        };

        let target = build_dir.join(file_name);
        fs::copy(&path, &target).map_err(|e| PreviewError::Write {
            path: target.display().to_string(),
            message: e.to_string(),
        })?;

        copied += 1;
    }

    tracing::debug!("Copied {} preview assets", copied);
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copies_svg_and_css_only() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("previewer-src");
        let build = temp.path().join("build");
        fs::create_dir_all(&src).unwrap();

        fs::write(src.join("preview.css"), "body{}").unwrap();
        fs::write(src.join("logo.svg"), "<svg/>").unwrap();
        fs::write(src.join("app.js"), "// not copied").unwrap();
        fs::write(src.join("index.html.j2"), "<html></html>").unwrap();

        let copied = copy_preview_assets(&src, &build).unwrap();

        assert_eq!(copied, 2);
        assert!(build.join("preview.css").exists());
        assert!(build.join("logo.svg").exists());
        assert!(!build.join("app.js").exists());
        assert!(!build.join("index.html.j2").exists());
    }

    #[test]
    fn missing_source_directory_is_fatal() {
        let temp = tempdir().unwrap();

        let result = copy_preview_assets(&temp.path().join("nope"), &temp.path().join("build"));

        assert!(matches!(result, Err(PreviewError::Read { .. })));
    }
}
