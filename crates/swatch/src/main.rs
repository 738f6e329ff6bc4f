//! Swatch CLI - component kit stylesheet builder and previewer.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;
mod runner;
mod tasks;

use runner::TaskRunner;
use tasks::TaskId;

#[derive(Parser)]
#[command(name = "swatch")]
#[command(about = "Component kit stylesheet builder and previewer")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to swatch.toml config file
    #[arg(short, long, default_value = "swatch.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a component kit project in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Build the stylesheets and the preview page
    Build,

    /// Run the stylesheet pipeline (clean, lint, transform, minify)
    BuildCss,

    /// Lint the stylesheet sources (report only)
    Stylelint,

    /// Transform entry stylesheets (imports, inlining, syntax lowering)
    Cssnext,

    /// Minify built stylesheets
    Cssmin,

    /// Remove previous stylesheet artifacts
    CssClean,

    /// Regenerate the preview page if component markup changed
    GeneratePreview,

    /// Regenerate the preview page unconditionally
    GeneratePreviewForce,

    /// Copy static preview assets into the build directory
    PreviewAssets,

    /// Bundle the preview application script
    PreviewJs,

    /// Start the development server with file watching and live reload
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Open the browser
        #[arg(long)]
        open: bool,
    },

    /// Clear the terminal
    ResetConsole,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Init { yes } => commands::init::run(yes)?,

        Commands::Serve { port, open } => {
            let settings = config::load(&cli.config)?;
            commands::serve::run(settings, port, open).await?;
        }

        Commands::Build => run_task(&cli.config, TaskId::Build)?,
        Commands::BuildCss => run_task(&cli.config, TaskId::BuildCss)?,
        Commands::Stylelint => run_task(&cli.config, TaskId::Stylelint)?,
        Commands::Cssnext => run_task(&cli.config, TaskId::Cssnext)?,
        Commands::Cssmin => run_task(&cli.config, TaskId::Cssmin)?,
        Commands::CssClean => run_task(&cli.config, TaskId::CssClean)?,
        Commands::GeneratePreview => run_task(&cli.config, TaskId::GeneratePreview)?,
        Commands::GeneratePreviewForce => run_task(&cli.config, TaskId::GeneratePreviewForce)?,
        Commands::PreviewAssets => run_task(&cli.config, TaskId::PreviewAssets)?,
        Commands::PreviewJs => run_task(&cli.config, TaskId::PreviewJs)?,
        Commands::ResetConsole => run_task(&cli.config, TaskId::ResetConsole)?,
    }

    Ok(())
}

/// Resolve a task through the graph and run it with its dependencies.
fn run_task(config_path: &PathBuf, task: TaskId) -> Result<()> {
    let settings = config::load(config_path)?;
    let mut runner = TaskRunner::new(settings.style, settings.preview);

    runner.run(task)
}
