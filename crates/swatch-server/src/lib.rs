//! Development server with live reload for swatch component kits.
//!
//! Serves the build directory with SPA-style fallback routing, watches the
//! stylesheet and preview source trees, and pushes reload signals to
//! connected browsers over a WebSocket channel.

pub mod reload;
pub mod server;
pub mod watcher;

pub use reload::{reload_client_script, ReloadHub, ReloadMessage};
pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent, WatchRules};
