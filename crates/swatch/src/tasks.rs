//! The build task graph.
//!
//! Task ordering is a data structure, not call-order convention: every named
//! task declares its dependencies, and execution order is resolved by a
//! deterministic depth-first walk (declared order preserved, shared
//! dependencies executed once, cycles rejected).

use std::collections::HashSet;

/// Every named task the CLI can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    /// Full build: stylesheets plus preview page
    Build,
    /// Stylesheet pipeline aggregate
    BuildCss,
    /// Report-only source linting
    Stylelint,
    /// Import bundling, asset inlining, syntax lowering
    Cssnext,
    /// Artifact minification
    Cssmin,
    /// Remove previous stylesheet artifacts
    CssClean,
    /// Conditional preview regeneration (markup-token decision)
    GeneratePreview,
    /// Unconditional preview regeneration
    GeneratePreviewForce,
    /// Copy static preview assets
    PreviewAssets,
    /// Bundle the preview application script
    PreviewJs,
    /// Clear the terminal
    ResetConsole,
}

impl TaskId {
    /// The task's public name.
    pub fn name(&self) -> &'static str {
        match self {
            TaskId::Build => "build",
            TaskId::BuildCss => "build-css",
            TaskId::Stylelint => "stylelint",
            TaskId::Cssnext => "cssnext",
            TaskId::Cssmin => "cssmin",
            TaskId::CssClean => "css-clean",
            TaskId::GeneratePreview => "generate-preview",
            TaskId::GeneratePreviewForce => "generate-preview-force",
            TaskId::PreviewAssets => "preview-assets",
            TaskId::PreviewJs => "preview-js",
            TaskId::ResetConsole => "reset-console",
        }
    }
}

/// Errors raised while resolving the task graph.
#[derive(Debug, thiserror::Error)]
pub enum TaskGraphError {
    #[error("Task dependency cycle involving '{0}'")]
    Cycle(&'static str),
}

/// A directed acyclic graph of tasks and their declared dependencies.
pub struct TaskGraph {
    edges: Vec<(TaskId, Vec<TaskId>)>,
}

impl TaskGraph {
    /// The standard task graph.
    pub fn standard() -> Self {
        Self {
            edges: vec![
                (TaskId::CssClean, vec![]),
                (TaskId::Stylelint, vec![]),
                (TaskId::Cssnext, vec![TaskId::CssClean, TaskId::Stylelint]),
                (TaskId::Cssmin, vec![TaskId::Cssnext]),
                (TaskId::BuildCss, vec![TaskId::Cssmin]),
                (TaskId::GeneratePreview, vec![TaskId::BuildCss]),
                (TaskId::PreviewAssets, vec![]),
                (TaskId::PreviewJs, vec![TaskId::PreviewAssets]),
                (
                    TaskId::GeneratePreviewForce,
                    vec![TaskId::PreviewAssets, TaskId::PreviewJs],
                ),
                (TaskId::ResetConsole, vec![]),
                (TaskId::Build, vec![TaskId::BuildCss, TaskId::GeneratePreview]),
            ],
        }
    }

    fn deps_of(&self, id: TaskId) -> &[TaskId] {
        self.edges
            .iter()
            .find(|(task, _)| *task == id)
            .map(|(_, deps)| deps.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a target into its execution order: transitive dependencies
    /// first (declared order), the target last, each task at most once.
    pub fn resolve(&self, target: TaskId) -> Result<Vec<TaskId>, TaskGraphError> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut visiting = HashSet::new();

        self.visit(target, &mut order, &mut done, &mut visiting)?;

        Ok(order)
    }

    fn visit(
        &self,
        id: TaskId,
        order: &mut Vec<TaskId>,
        done: &mut HashSet<TaskId>,
        visiting: &mut HashSet<TaskId>,
    ) -> Result<(), TaskGraphError> {
        if done.contains(&id) {
            return Ok(());
        }

        if !visiting.insert(id) {
            return Err(TaskGraphError::Cycle(id.name()));
        }

        for dep in self.deps_of(id) {
            self.visit(*dep, order, done, visiting)?;
        }

        visiting.remove(&id);
        done.insert(id);
        order.push(id);

        Ok(())
    }
}
