//! Initialize a component kit project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command in the current directory.
pub fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing swatch project...");

    scaffold(Path::new("."), yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'swatch serve' to start the development server.");

    Ok(())
}

/// Write the project scaffolding under `root`.
///
/// Existing files are left alone unless `yes` is set.
pub fn scaffold(root: &Path, yes: bool) -> Result<()> {
    let files: &[(&str, &str)] = &[
        ("swatch.toml", DEFAULT_CONFIG),
        ("patterns.yaml", DEFAULT_PATTERNS),
        ("src/components.css", DEFAULT_ENTRY),
        ("src/dark-components.css", DEFAULT_DARK_ENTRY),
        ("src/components/base.css", DEFAULT_BASE),
        ("src/components/button.css", DEFAULT_BUTTON),
        ("src/components/card.css", DEFAULT_CARD),
        ("src/components/check.svg", DEFAULT_CHECK_SVG),
        ("previewer-src/index.html.j2", DEFAULT_TEMPLATE),
        ("previewer-src/app.js", DEFAULT_APP_JS),
        ("previewer-src/theme.js", DEFAULT_THEME_JS),
        ("previewer-src/preview.css", DEFAULT_PREVIEW_CSS),
    ];

    for (relative, content) in files {
        let path = root.join(relative);

        if path.exists() && !yes {
            tracing::warn!("{} already exists. Use --yes to overwrite.", relative);
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write {}", relative))?;
        tracing::info!("Created {}", relative);
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Swatch configuration

[css]
# Stylesheet source tree
src = "src"

# Flat build output directory
build = "build"

# Consumer-layout mirror directory (second copy of every artifact)
mirror = "build/css"

# Bundle base name: entries are <basename>.css and *-<basename>.css
basename = "components"

[preview]
# Preview application sources
src = "previewer-src"
template = "previewer-src/index.html.j2"
patterns = "patterns.yaml"

[serve]
port = 4321
"#;

const DEFAULT_ENTRY: &str = r#"@import "components/base.css";
@import "components/button.css";
@import "components/card.css";
"#;

const DEFAULT_DARK_ENTRY: &str = r#"@import "components/base.css";
@import "components/button.css";
@import "components/card.css";

:root {
  --background: #16161d;
  --foreground: #e8e8ef;
  --surface: #222230;
  --border: #3a3a4a;
}
"#;

const DEFAULT_BASE: &str = r#":root {
  --background: #ffffff;
  --foreground: #1a1a24;
  --surface: #f4f4f8;
  --border: #d8d8e0;
  --primary: #3451b2;
  --primary-foreground: #ffffff;
  --radius: 6px;
}

body {
  background: var(--background);
  color: var(--foreground);
}
"#;

const DEFAULT_BUTTON: &str = r#"/*
~button
name: Button
category: Form
description: Clickable actions in plain and primary emphasis.
markup: |
  <button class="btn">Button</button>
  <button class="btn btn--primary">Primary</button>
  <button class="btn btn--ok">Done</button>
*/

.btn {
  display: inline-block;
  padding: 0.5em 1.1em;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  background: var(--surface);
  color: var(--foreground);
  cursor: pointer;
}

.btn--primary {
  border-color: var(--primary);
  background: var(--primary);
  color: var(--primary-foreground);
}

.btn--ok {
  padding-left: 2em;
  background-image: url("check.svg");
  background-repeat: no-repeat;
  background-position: 0.6em center;
  background-size: 1em;
}
"#;

const DEFAULT_CARD: &str = r#"/*
~card
name: Card
category: Layout
markup: |
  <div class="card">
    <h3 class="card__title">Card</h3>
    <p class="card__body">Grouped content on a raised surface.</p>
  </div>
*/

.card {
  padding: 1em 1.25em;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  background: var(--surface);
}

.card__title {
  margin: 0 0 0.5em;
}

.card__body {
  margin: 0;
}
"#;

const DEFAULT_CHECK_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"><path fill="currentColor" d="M6.3 12.3 2 8l1.4-1.4 2.9 2.9 6.3-6.3L14 4.6z"/></svg>
"#;

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Component preview</title>
  <link rel="stylesheet" id="theme-stylesheet" href="components.css">
  <link rel="stylesheet" href="preview.css">
</head>
<body>
  <header class="preview-header">
    <h1>Components</h1>
    <select id="theme-select" aria-label="Theme">
      {% for theme in themes %}<option value="{{ theme }}">{{ theme }}</option>
      {% endfor %}
    </select>
  </header>

  <main class="preview-main">
    {% for component in components %}
    <section class="preview-component" id="{{ component.id }}">
      <h2>{{ component.annotation.name | default(component.id) }}</h2>
      {% if component.annotation.description %}
      <p>{{ component.annotation.description }}</p>
      {% endif %}
      {% if component.annotation.markup %}
      <div class="preview-stage">{{ component.annotation.markup | safe }}</div>
      <pre class="preview-source"><code>{{ component.annotation.markup }}</code></pre>
      {% endif %}
    </section>
    {% endfor %}

    {% if patterns %}
    <h1>Patterns</h1>
    {% for pattern in patterns %}
    <section class="preview-pattern">
      <h2>{{ pattern.name }}</h2>
      {% if pattern.markup %}
      <div class="preview-stage">{{ pattern.markup | safe }}</div>
      {% endif %}
    </section>
    {% endfor %}
    {% endif %}
  </main>

  <script src="/__reload.js"></script>
  <script src="app.gen.js"></script>
</body>
</html>
"#;

const DEFAULT_APP_JS: &str = r#"import { applyTheme, themeFromLocation } from './theme.js';

const select = document.getElementById('theme-select');

if (select) {
  const initial = themeFromLocation(window.location);
  if (initial) {
    select.value = initial;
    applyTheme(initial);
  }

  select.addEventListener('change', function () {
    applyTheme(select.value);
    history.replaceState(null, '', '/' + select.value);
  });
}
"#;

const DEFAULT_THEME_JS: &str = r#"export function applyTheme(name) {
  const link = document.getElementById('theme-stylesheet');
  if (link) {
    link.href = name + '.css';
  }
}

export function themeFromLocation(location) {
  const segment = location.pathname.replace(/^\/+|\/+$/g, '');
  return segment.length > 0 ? decodeURIComponent(segment) : null;
}
"#;

const DEFAULT_PREVIEW_CSS: &str = r#"body {
  margin: 0;
  font-family: system-ui, sans-serif;
}

.preview-header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 1rem 2rem;
  border-bottom: 1px solid var(--border, #d8d8e0);
}

.preview-main {
  max-width: 860px;
  margin: 0 auto;
  padding: 1rem 2rem 4rem;
}

.preview-component,
.preview-pattern {
  margin-top: 2.5rem;
}

.preview-stage {
  display: flex;
  flex-wrap: wrap;
  gap: 0.75rem;
  align-items: center;
  padding: 1.5rem;
  border: 1px dashed var(--border, #d8d8e0);
  border-radius: 8px;
}

.preview-source {
  overflow-x: auto;
  padding: 0.75rem 1rem;
  background: var(--surface, #f4f4f8);
  border-radius: 8px;
  font-size: 0.85em;
}
"#;

const DEFAULT_PATTERNS: &str = r#"name: Form row
markup: |
  <div class="card">
    <button class="btn btn--primary">Save</button>
    <button class="btn">Cancel</button>
  </div>
---
name: Confirmation
markup: |
  <div class="card">
    <h3 class="card__title">Saved</h3>
    <button class="btn btn--ok">Done</button>
  </div>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scaffolds_a_complete_project() {
        let temp = tempdir().unwrap();

        scaffold(temp.path(), false).unwrap();

        for file in [
            "swatch.toml",
            "patterns.yaml",
            "src/components.css",
            "src/dark-components.css",
            "src/components/button.css",
            "src/components/check.svg",
            "previewer-src/index.html.j2",
            "previewer-src/app.js",
            "previewer-src/theme.js",
            "previewer-src/preview.css",
        ] {
            assert!(temp.path().join(file).exists(), "missing {}", file);
        }
    }

    #[test]
    fn refuses_to_overwrite_without_yes() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("swatch.toml"), "# mine").unwrap();

        scaffold(temp.path(), false).unwrap();

        let content = fs::read_to_string(temp.path().join("swatch.toml")).unwrap();
        assert_eq!(content, "# mine");
    }

    #[test]
    fn overwrites_with_yes() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("swatch.toml"), "# mine").unwrap();

        scaffold(temp.path(), true).unwrap();

        let content = fs::read_to_string(temp.path().join("swatch.toml")).unwrap();
        assert!(content.contains("[css]"));
    }
}
