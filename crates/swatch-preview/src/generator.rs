//! Preview page generation.

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{context, Environment};

use crate::assets::copy_preview_assets;
use crate::bundle::{bundle_script, BundleError};
use crate::component::{parse_components, Component, ComponentError};
use crate::patterns::load_patterns;

/// Configuration for the preview generator.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Preview application source directory
    pub src_dir: PathBuf,

    /// Page template path
    pub template: PathBuf,

    /// Multi-document patterns file
    pub patterns: PathBuf,

    /// Build output directory (stylesheets in, preview page out)
    pub build_dir: PathBuf,

    /// Stylesheet bundle base name, used to locate the compiled stylesheet
    /// and to derive theme names
    pub basename: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("previewer-src"),
            template: PathBuf::from("previewer-src/index.html.j2"),
            patterns: PathBuf::from("patterns.yaml"),
            build_dir: PathBuf::from("build"),
            basename: "components".to_string(),
        }
    }
}

/// Errors that can occur during preview generation.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid patterns document {path}: {message}")]
    Patterns { path: String, message: String },

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Bundle(#[from] BundleError),
}

/// Generates the static preview page and its supporting files.
pub struct PreviewGenerator {
    config: PreviewConfig,
}

impl PreviewGenerator {
    /// Create a generator for the given configuration.
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }

    /// Access the generator configuration.
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Path of the compiled stylesheet the component list is parsed from.
    pub fn compiled_stylesheet(&self) -> PathBuf {
        self.config
            .build_dir
            .join(format!("{}.css", self.config.basename))
    }

    /// Parse the compiled stylesheet into its ordered component list.
    ///
    /// A missing stylesheet is fatal; a stylesheet without documentation
    /// blocks yields an empty list.
    pub fn parse_components(&self) -> Result<Vec<Component>, PreviewError> {
        let path = self.compiled_stylesheet();

        let css = fs::read_to_string(&path).map_err(|e| PreviewError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(parse_components(&css)?)
    }

    /// Theme names derived from stylesheet artifacts in the build directory.
    pub fn discover_themes(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.config.build_dir) else {
            return Vec::new();
        };

        let mut themes: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().to_str().map(|s| s.to_string()))
            .filter(|name| is_theme_artifact(name, &self.config.basename))
            .filter_map(|name| name.strip_suffix(".css").map(|s| s.to_string()))
            .collect();

        themes.sort();
        themes
    }

    /// Copy the static preview assets into the build directory.
    pub fn refresh_assets(&self) -> Result<usize, PreviewError> {
        copy_preview_assets(&self.config.src_dir, &self.config.build_dir)
    }

    /// Bundle the preview application into `app.gen.js`.
    pub fn bundle_app(&self) -> Result<PathBuf, PreviewError> {
        let entry = self.config.src_dir.join("app.js");
        let bundle = bundle_script(&entry)?;

        fs::create_dir_all(&self.config.build_dir).map_err(|e| PreviewError::Write {
            path: self.config.build_dir.display().to_string(),
            message: e.to_string(),
        })?;

        let out = self.config.build_dir.join("app.gen.js");
        fs::write(&out, &bundle.code).map_err(|e| PreviewError::Write {
            path: out.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!("Bundled {} modules into {}", bundle.modules, out.display());
        Ok(out)
    }

    /// Render the preview page from the template, components, discovered
    /// themes, and loaded patterns.
    pub fn generate(&self, components: &[Component]) -> Result<PathBuf, PreviewError> {
        let source = fs::read_to_string(&self.config.template).map_err(|e| PreviewError::Read {
            path: self.config.template.display().to_string(),
            message: e.to_string(),
        })?;

        let patterns = load_patterns(&self.config.patterns)?;
        let themes = self.discover_themes();

        let mut env = Environment::new();
        env.add_template_owned("index.html".to_string(), source)
            .map_err(|e| PreviewError::Template(e.to_string()))?;

        let html = env
            .get_template("index.html")
            .and_then(|tmpl| {
                tmpl.render(context! {
                    components => components,
                    themes => themes,
                    patterns => patterns,
                })
            })
            .map_err(|e| PreviewError::Template(e.to_string()))?;

        fs::create_dir_all(&self.config.build_dir).map_err(|e| PreviewError::Write {
            path: self.config.build_dir.display().to_string(),
            message: e.to_string(),
        })?;

        let out = self.config.build_dir.join("index.html");
        fs::write(&out, html).map_err(|e| PreviewError::Write {
            path: out.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(
            "Rendered {} with {} components, {} themes",
            out.display(),
            components.len(),
            themes.len()
        );

        Ok(out)
    }
}

/// Whether a build-directory file name is a theme stylesheet artifact
/// (`<basename>.css` or `*-<basename>.css`, not minified).
fn is_theme_artifact(file_name: &str, basename: &str) -> bool {
    let plain = format!("{}.css", basename);
    file_name == plain || file_name.ends_with(&format!("-{}", plain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<body>
{% for theme in themes %}<option>{{ theme }}</option>{% endfor %}
{% for component in components %}<section id="{{ component.id }}">{{ component.annotation.markup | safe }}</section>{% endfor %}
{% for pattern in patterns %}<article>{{ pattern.name }}</article>{% endfor %}
</body>
</html>"#;

    fn generator_in(root: &Path) -> PreviewGenerator {
        PreviewGenerator::new(PreviewConfig {
            src_dir: root.join("previewer-src"),
            template: root.join("previewer-src/index.html.j2"),
            patterns: root.join("patterns.yaml"),
            build_dir: root.join("build"),
            basename: "components".to_string(),
        })
    }

    fn scaffold(root: &Path) {
        fs::create_dir_all(root.join("previewer-src")).unwrap();
        fs::create_dir_all(root.join("build")).unwrap();
        fs::write(root.join("previewer-src/index.html.j2"), TEMPLATE).unwrap();
        fs::write(root.join("patterns.yaml"), "name: Forms\n---\nname: Lists\n").unwrap();
        fs::write(
            root.join("build/components.css"),
            "/*\n~button\nname: Button\nmarkup: |\n  <button class=\"btn\">B</button>\n*/\n.btn{color:red}\n",
        )
        .unwrap();
        fs::write(root.join("build/dark-components.css"), ".btn{color:black}\n").unwrap();
        fs::write(root.join("build/components.min.css"), "").unwrap();
    }

    #[test]
    fn parses_components_from_compiled_stylesheet() {
        let temp = tempdir().unwrap();
        scaffold(temp.path());

        let components = generator_in(temp.path()).parse_components().unwrap();

        assert_eq!(components.len(), 1);
        assert_eq!(components[0].id, "button");
    }

    #[test]
    fn missing_compiled_stylesheet_is_fatal() {
        let temp = tempdir().unwrap();

        let result = generator_in(temp.path()).parse_components();

        assert!(matches!(result, Err(PreviewError::Read { .. })));
    }

    #[test]
    fn discovers_themes_from_artifact_names() {
        let temp = tempdir().unwrap();
        scaffold(temp.path());

        let themes = generator_in(temp.path()).discover_themes();

        assert_eq!(themes, vec!["components", "dark-components"]);
    }

    #[test]
    fn renders_page_with_components_themes_and_patterns() {
        let temp = tempdir().unwrap();
        scaffold(temp.path());

        let generator = generator_in(temp.path());
        let components = generator.parse_components().unwrap();
        let out = generator.generate(&components).unwrap();

        let html = fs::read_to_string(out).unwrap();
        assert!(html.contains("<button class=\"btn\">B</button>"));
        assert!(html.contains("<option>dark-components</option>"));
        assert!(html.contains("<article>Forms</article>"));
        assert!(html.contains("<article>Lists</article>"));
    }

    #[test]
    fn missing_template_is_fatal() {
        let temp = tempdir().unwrap();
        scaffold(temp.path());
        fs::remove_file(temp.path().join("previewer-src/index.html.j2")).unwrap();

        let generator = generator_in(temp.path());
        let result = generator.generate(&[]);

        assert!(matches!(result, Err(PreviewError::Read { .. })));
    }
}
