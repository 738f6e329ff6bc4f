//! Task execution.

use std::io::Write as _;

use anyhow::{Context, Result};

use swatch_css::{StyleConfig, StylePipeline};
use swatch_preview::{decide_regeneration, PreviewConfig, PreviewGenerator};
use swatch_server::{ReloadHub, ReloadMessage};

use crate::tasks::{TaskGraph, TaskId};

/// State retained across preview generations.
///
/// Holds only the markup token from the previous run; it starts empty, so
/// the first generation after process start always rebuilds.
#[derive(Debug, Default)]
pub struct PreviewState {
    last_markup_token: String,
}

/// Executes tasks resolved through the task graph.
pub struct TaskRunner {
    graph: TaskGraph,
    style: StylePipeline,
    preview: PreviewGenerator,
    state: PreviewState,
    hub: Option<ReloadHub>,
}

impl TaskRunner {
    /// Create a runner for the given configuration.
    pub fn new(style: StyleConfig, preview: PreviewConfig) -> Self {
        Self {
            graph: TaskGraph::standard(),
            style: StylePipeline::new(style),
            preview: PreviewGenerator::new(preview),
            state: PreviewState::default(),
            hub: None,
        }
    }

    /// Attach a reload hub so rebuilds signal connected browsers.
    pub fn with_reload_hub(mut self, hub: ReloadHub) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Run a task and everything it depends on, in graph order.
    pub fn run(&mut self, target: TaskId) -> Result<()> {
        for task in self.graph.resolve(target)? {
            self.run_single(task)
                .with_context(|| format!("task '{}' failed", task.name()))?;
        }

        Ok(())
    }

    fn run_single(&mut self, task: TaskId) -> Result<()> {
        tracing::debug!("Running {}", task.name());

        match task {
            // Aggregates: their work is entirely in their dependencies.
            TaskId::Build | TaskId::BuildCss => {}

            TaskId::CssClean => self.style.clean()?,

            TaskId::Stylelint => {
                let report = self.style.lint();
                tracing::info!(
                    "Lint: {} files, {} findings",
                    report.files,
                    report.findings.len()
                );
            }

            TaskId::Cssnext => {
                let transformed = self.style.transform()?;
                tracing::info!("Transformed {} entry stylesheets", transformed);
                self.send(ReloadMessage::RefreshStyles);
            }

            TaskId::Cssmin => self.style.minify()?,

            TaskId::PreviewAssets => {
                self.preview.refresh_assets()?;
            }

            TaskId::PreviewJs => {
                self.preview.bundle_app()?;
            }

            TaskId::GeneratePreview => {
                self.generate_preview()?;
            }

            TaskId::GeneratePreviewForce => {
                // Dependencies already refreshed assets and the bundle;
                // the retained token is deliberately left untouched.
                let components = self.preview.parse_components()?;
                self.preview.generate(&components)?;
                self.send(ReloadMessage::Reload);
            }

            TaskId::ResetConsole => reset_console(),
        }

        Ok(())
    }

    /// Conditionally regenerate the preview.
    ///
    /// Parses the compiled stylesheet, compares the markup token against the
    /// retained one, and only on a difference re-runs the expensive asset
    /// refresh, bundle, and page render. Returns whether a rebuild happened.
    pub fn generate_preview(&mut self) -> Result<bool> {
        let components = self.preview.parse_components()?;
        let decision = decide_regeneration(&self.state.last_markup_token, &components);

        if decision.rebuild {
            tracing::info!(
                "Component markup changed; regenerating preview ({} components)",
                components.len()
            );
            self.preview.refresh_assets()?;
            self.preview.bundle_app()?;
            self.preview.generate(&components)?;
            self.send(ReloadMessage::Reload);
        } else {
            tracing::info!("Component markup unchanged; preview rebuild skipped");
        }

        self.state.last_markup_token = decision.token;
        Ok(decision.rebuild)
    }

    /// Log the stylesheet artifacts currently in the build directory.
    pub fn log_built_css(&self) {
        let artifacts = self.style.built_artifacts();
        if artifacts.is_empty() {
            return;
        }

        tracing::info!("Built CSS files:");
        for path in artifacts {
            tracing::info!("  {}", path.display());
        }
    }

    fn send(&self, msg: ReloadMessage) {
        if let Some(hub) = &self.hub {
            hub.send(msg);
        }
    }
}

/// Clear the terminal.
pub fn reset_console() {
    print!("\x1bc");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    use crate::commands::init;

    fn runner_in(root: &Path) -> TaskRunner {
        let style = StyleConfig {
            src_dir: root.join("src"),
            build_dir: root.join("build"),
            mirror_dir: root.join("build/css"),
            inline_root: root.join("src/components"),
            ..StyleConfig::default()
        };

        let preview = PreviewConfig {
            src_dir: root.join("previewer-src"),
            template: root.join("previewer-src/index.html.j2"),
            patterns: root.join("patterns.yaml"),
            build_dir: root.join("build"),
            ..PreviewConfig::default()
        };

        TaskRunner::new(style, preview)
    }

    #[test]
    fn full_build_produces_all_artifacts() {
        let temp = tempdir().unwrap();
        init::scaffold(temp.path(), true).unwrap();

        let mut runner = runner_in(temp.path());
        runner.run(TaskId::Build).unwrap();

        let build = temp.path().join("build");
        assert!(build.join("components.css").exists());
        assert!(build.join("components.min.css").exists());
        assert!(build.join("dark-components.css").exists());
        assert!(build.join("css/components.css").exists());
        assert!(build.join("index.html").exists());
        assert!(build.join("app.gen.js").exists());
        assert!(build.join("preview.css").exists());

        let html = fs::read_to_string(build.join("index.html")).unwrap();
        assert!(html.contains("class=\"btn\""));
    }

    #[test]
    fn unchanged_markup_skips_the_second_rebuild() {
        let temp = tempdir().unwrap();
        init::scaffold(temp.path(), true).unwrap();

        let mut runner = runner_in(temp.path());
        runner.run(TaskId::BuildCss).unwrap();

        assert!(runner.generate_preview().unwrap());
        assert!(!runner.generate_preview().unwrap());
    }

    #[test]
    fn changed_markup_triggers_regeneration() {
        let temp = tempdir().unwrap();
        init::scaffold(temp.path(), true).unwrap();

        let mut runner = runner_in(temp.path());
        runner.run(TaskId::BuildCss).unwrap();
        assert!(runner.generate_preview().unwrap());

        // Change one component's example markup and rebuild the CSS.
        let button = temp.path().join("src/components/button.css");
        let source = fs::read_to_string(&button).unwrap();
        fs::write(&button, source.replace("Button</button>", "Renamed</button>")).unwrap();
        runner.run(TaskId::BuildCss).unwrap();

        assert!(runner.generate_preview().unwrap());
        assert!(!runner.generate_preview().unwrap());
    }

    #[test]
    fn force_rebuilds_even_when_token_is_unchanged() {
        let temp = tempdir().unwrap();
        init::scaffold(temp.path(), true).unwrap();

        let mut runner = runner_in(temp.path());
        runner.run(TaskId::Build).unwrap();

        let page = temp.path().join("build/index.html");
        fs::remove_file(&page).unwrap();

        runner.run(TaskId::GeneratePreviewForce).unwrap();

        assert!(page.exists());
    }
}
