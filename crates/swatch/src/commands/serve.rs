//! Development server command.

use anyhow::Result;

use swatch_server::{DevServer, FileWatcher, ReloadHub, WatchEvent};

use crate::config::Settings;
use crate::runner::{reset_console, TaskRunner};
use crate::tasks::TaskId;

/// Run the serve command: initial build, then watch and serve.
pub async fn run(settings: Settings, port: Option<u16>, open: bool) -> Result<()> {
    let hub = ReloadHub::new();

    let mut runner = TaskRunner::new(settings.style.clone(), settings.preview.clone())
        .with_reload_hub(hub.clone());

    runner.run(TaskId::ResetConsole)?;
    runner.run(TaskId::Build)?;
    runner.log_built_css();

    let mut server_config = settings.server.clone();
    if let Some(port) = port {
        server_config.port = port;
    }
    server_config.open = open;

    tracing::info!(
        "Access URL: http://{}:{}",
        server_config.host,
        server_config.port
    );

    let (watcher, mut events) = FileWatcher::new(settings.watch.clone())?;

    let server = DevServer::new(server_config, hub.clone());
    tokio::spawn(async move {
        if let Err(e) = server.start().await {
            tracing::error!("Dev server error: {}", e);
        }
    });

    // Each watch event runs its pipeline to completion before the next one
    // is processed. A task failure is logged and the loop keeps going; the
    // watcher re-trigger is the retry mechanism.
    while let Some(event) = events.recv().await {
        reset_console();

        let result = match event {
            WatchEvent::StyleChanged(path) => {
                tracing::info!("Stylesheet changed: {}", path.display());
                runner.run(TaskId::GeneratePreview)
            }
            WatchEvent::PreviewChanged(path) => {
                tracing::info!("Preview source changed: {}", path.display());
                runner.run(TaskId::GeneratePreviewForce)
            }
        };

        if let Err(e) = result {
            tracing::error!("{:#}", e);
        }

        runner.log_built_css();
    }

    drop(watcher);
    Ok(())
}
