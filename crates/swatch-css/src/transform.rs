//! Entry transformation: import bundling, asset inlining, syntax lowering.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use lightningcss::bundler::{Bundler, FileProvider};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions};
use lightningcss::targets::Targets;
use regex::Regex;

use crate::inline::inline_svg_urls;
use crate::pipeline::{StyleConfig, StyleError};

/// Transform one entry stylesheet into its final (non-minified) form.
///
/// Resolves `@import`s through the filesystem, lowers modern syntax to the
/// configured browser targets, and inlines small SVG url() references as
/// base64 data URIs. Documentation comment blocks (`~` sentinel) do not
/// survive the CSS printer, so they are collected from the import graph in
/// stylesheet order and re-emitted ahead of the compiled rules.
pub fn transform_entry(
    config: &StyleConfig,
    entry: &Path,
    targets: Targets,
) -> Result<String, StyleError> {
    let provider = FileProvider::new();

    let options = ParserOptions {
        filename: entry.display().to_string(),
        error_recovery: true,
        ..ParserOptions::default()
    };

    let mut bundler = Bundler::new(&provider, None, options);

    let mut stylesheet = bundler.bundle(entry).map_err(|e| StyleError::Transform {
        path: entry.display().to_string(),
        message: e.to_string(),
    })?;

    stylesheet
        .minify(MinifyOptions {
            targets: targets.clone(),
            ..MinifyOptions::default()
        })
        .map_err(|e| StyleError::Transform {
            path: entry.display().to_string(),
            message: e.to_string(),
        })?;

    let output = stylesheet
        .to_css(PrinterOptions {
            minify: false,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| StyleError::Transform {
            path: entry.display().to_string(),
            message: e.to_string(),
        })?;

    // The bundler rebases url() references from imported files, so resolve
    // against the entry's directory as well as the configured root.
    let entry_dir = entry.parent().unwrap_or(Path::new("."));
    let css = inline_svg_urls(
        &output.code,
        &[config.inline_root.as_path(), entry_dir],
        config.inline_max_bytes,
    );

    let annotations = collect_annotation_blocks(entry)?;
    if annotations.is_empty() {
        Ok(css)
    } else {
        Ok(format!("{}\n{}", annotations.join("\n"), css))
    }
}

static CSS_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?["']([^"']+)["']\s*\)?\s*[^;]*;"#)
        .expect("Invalid css import regex")
});

/// Collect `~`-sentinel comment blocks from an entry's import graph, in
/// stylesheet order (imports are inlined at their position, depth first).
pub fn collect_annotation_blocks(entry: &Path) -> Result<Vec<String>, StyleError> {
    let mut seen = HashSet::new();
    let mut blocks = Vec::new();
    collect_from_file(entry, &mut seen, &mut blocks)?;
    Ok(blocks)
}

fn collect_from_file(
    path: &Path,
    seen: &mut HashSet<PathBuf>,
    blocks: &mut Vec<String>,
) -> Result<(), StyleError> {
    let canonical = path.to_path_buf();
    if !seen.insert(canonical) {
        return Ok(());
    }

    let source = fs::read_to_string(path).map_err(|e| StyleError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let dir = path.parent().unwrap_or(Path::new("."));

    // Walk imports and comments in positional order so annotation blocks
    // keep stylesheet order.
    let mut events: Vec<(usize, Event)> = Vec::new();

    for caps in CSS_IMPORT_RE.captures_iter(&source) {
        let whole = caps.get(0).expect("capture 0 always present");
        let target = caps.get(1).expect("import target capture").as_str();
        events.push((whole.start(), Event::Import(target.to_string())));
    }

    for (start, block) in comment_blocks(&source) {
        events.push((start, Event::Comment(block)));
    }

    events.sort_by_key(|(pos, _)| *pos);

    for (_, event) in events {
        match event {
            Event::Import(target) => {
                let resolved = dir.join(&target);
                if resolved.is_file() {
                    collect_from_file(&resolved, seen, blocks)?;
                }
                // Unresolvable imports are the bundler's diagnostic to report.
            }
            Event::Comment(block) => {
                if is_annotation_block(&block) {
                    blocks.push(block);
                }
            }
        }
    }

    Ok(())
}

enum Event {
    Import(String),
    Comment(String),
}

/// All `/* ... */` blocks in a stylesheet with their start offsets.
fn comment_blocks(source: &str) -> Vec<(usize, String)> {
    let mut found = Vec::new();
    let mut rest = source;
    let mut offset = 0;

    while let Some(start) = rest.find("/*") {
        let Some(end) = rest[start + 2..].find("*/") else {
            break;
        };
        let block = &rest[start..start + 2 + end + 2];
        found.push((offset + start, block.to_string()));

        let consumed = start + 2 + end + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }

    found
}

/// Whether a comment block's first content line carries the `~` sentinel.
fn is_annotation_block(block: &str) -> bool {
    block
        .trim_start_matches("/*")
        .lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| line.trim().starts_with('~'))
}
