//! File watching for the dev server.
//!
//! Two watch rules: changes under the stylesheet source tree re-enter the
//! style pipeline; changes under the preview source tree or to the patterns
//! file force a full preview regeneration.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A stylesheet source changed
    StyleChanged(PathBuf),

    /// A preview source or the patterns file changed
    PreviewChanged(PathBuf),
}

/// The path sets the two watch rules match against.
#[derive(Debug, Clone)]
pub struct WatchRules {
    /// Stylesheet source tree
    pub style_dir: PathBuf,

    /// Preview application source tree
    pub preview_dir: PathBuf,

    /// Patterns document
    pub patterns: PathBuf,
}

impl WatchRules {
    /// Classify a changed path, or `None` when no rule matches.
    pub fn classify(&self, path: &Path) -> Option<WatchEvent> {
        if path.starts_with(&self.preview_dir) || path == self.patterns {
            return Some(WatchEvent::PreviewChanged(path.to_path_buf()));
        }

        if path.starts_with(&self.style_dir)
            && path.extension().and_then(|e| e.to_str()) == Some("css")
        {
            return Some(WatchEvent::StyleChanged(path.to_path_buf()));
        }

        None
    }

    fn watch_roots(&self) -> Vec<PathBuf> {
        vec![
            self.style_dir.clone(),
            self.preview_dir.clone(),
            self.patterns.clone(),
        ]
    }
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given rules.
    ///
    /// Returns the watcher and a channel to receive classified events.
    pub fn new(
        rules: WatchRules,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        // Create the watcher
        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        // Watch all roots
        for root in rules.watch_roots() {
            if root.exists() {
                watcher
                    .watch(&root, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            }
        }

        // Spawn a thread to debounce, classify, and forward events
        std::thread::spawn(move || {
            let mut last_event_time: Option<std::time::Instant> = None;
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                if !matches!(
                    event.kind,
                    notify::EventKind::Create(_)
                        | notify::EventKind::Modify(_)
                        | notify::EventKind::Remove(_)
                ) {
                    continue;
                }

                // Debounce rapid events
                let now = std::time::Instant::now();
                if last_event_time.is_some_and(|t| now.duration_since(t) < debounce_duration) {
                    continue;
                }
                last_event_time = Some(now);

                for path in event.paths {
                    if let Some(classified) = rules.classify(&path) {
                        let _ = async_tx.blocking_send(classified);
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn rules_in(root: &Path) -> WatchRules {
        WatchRules {
            style_dir: root.join("src"),
            preview_dir: root.join("previewer-src"),
            patterns: root.join("patterns.yaml"),
        }
    }

    #[test]
    fn classifies_style_sources() {
        let rules = rules_in(Path::new("/project"));

        assert_eq!(
            rules.classify(Path::new("/project/src/components/button.css")),
            Some(WatchEvent::StyleChanged(PathBuf::from(
                "/project/src/components/button.css"
            )))
        );
        assert_eq!(rules.classify(Path::new("/project/src/notes.txt")), None);
    }

    #[test]
    fn classifies_preview_sources_and_patterns() {
        let rules = rules_in(Path::new("/project"));

        assert!(matches!(
            rules.classify(Path::new("/project/previewer-src/app.js")),
            Some(WatchEvent::PreviewChanged(_))
        ));
        assert!(matches!(
            rules.classify(Path::new("/project/patterns.yaml")),
            Some(WatchEvent::PreviewChanged(_))
        ));
        assert_eq!(rules.classify(Path::new("/project/README.md")), None);
    }

    #[test]
    fn preview_rule_wins_for_preview_css() {
        // Stylesheets inside the preview tree belong to the preview rule.
        let rules = rules_in(Path::new("/project"));

        assert!(matches!(
            rules.classify(Path::new("/project/previewer-src/preview.css")),
            Some(WatchEvent::PreviewChanged(_))
        ));
    }

    #[tokio::test]
    async fn watches_file_changes() {
        let temp = tempdir().unwrap();
        let rules = rules_in(temp.path());
        fs::create_dir_all(&rules.style_dir).unwrap();

        // Create the watcher first (so it catches file creation)
        let (watcher, mut rx) = FileWatcher::new(rules.clone()).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(rules.style_dir.join("button.css"), ".btn {}").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        assert!(matches!(
            event.unwrap(),
            Some(WatchEvent::StyleChanged(_))
        ));
    }
}
