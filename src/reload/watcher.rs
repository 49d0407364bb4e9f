//! Source file watcher for hot reload.
//!
//! # Design Decisions
//! - The watcher follows the active table: after any install (HTTP reload,
//!   SIGHUP or its own) it re-reads the store's source path and moves its
//!   directory watch there
//! - Only edits to the file currently serving trigger a reload, so editing
//!   a file that was switched away from never reverts an explicit reload

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::reload::Reloader;

/// Watches the active source file and reloads the table when it changes.
pub struct SourceWatcher {
    path: PathBuf,
    debounce: Duration,
}

impl SourceWatcher {
    /// `path` is used until the store reports a source of its own.
    pub fn new(path: &Path, debounce: Duration) -> Self {
        Self {
            path: path.to_path_buf(),
            debounce,
        }
    }

    /// Start watching. The returned task owns the notify watcher and ends on shutdown.
    ///
    /// The parent directory is watched rather than the file itself so that
    /// editors that replace the file on save are still picked up.
    pub fn spawn(
        self,
        reloader: Reloader,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<JoinHandle<()>, notify::Error> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<PathBuf>>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        let _ = tx.send(event.paths);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default(),
        )?;

        let mut active = active_path(&reloader).unwrap_or(self.path);
        let mut watched = watch_dir(&active);
        watcher.watch(&watched, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %active.display(), "Source watcher started");

        let mut installs = reloader.subscribe_installs();
        let debounce = self.debounce;

        Ok(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.recv() => break,
                    changed = installs.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let Some(current) = active_path(&reloader) else { continue };
                        if current == active {
                            continue;
                        }
                        let dir = watch_dir(&current);
                        if dir != watched {
                            if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
                                tracing::error!(path = %current.display(), error = %e, "Failed to watch new source");
                                continue;
                            }
                            if let Err(e) = watcher.unwatch(&watched) {
                                tracing::warn!(dir = %watched.display(), error = %e, "Failed to unwatch previous source");
                            }
                            watched = dir;
                        }
                        tracing::info!(from = %active.display(), to = %current.display(), "Source watcher following new source");
                        active = current;
                    }
                    event = rx.recv() => {
                        let Some(mut paths) = event else { break };

                        // Coalesce the burst of events a single save produces.
                        tokio::time::sleep(debounce).await;
                        while let Ok(more) = rx.try_recv() {
                            paths.extend(more);
                        }

                        // The active source may have changed while debouncing.
                        let target = active_path(&reloader).unwrap_or_else(|| active.clone());
                        if !paths.iter().any(|p| same_file(p, &target)) {
                            continue;
                        }

                        tracing::info!(path = %target.display(), "Source change detected, reloading...");
                        // Failures are logged by the reloader; the current table stays active.
                        let _ = reloader.reload_path(target).await;
                    }
                }
            }
            tracing::debug!("Source watcher stopped");
        }))
    }
}

fn active_path(reloader: &Reloader) -> Option<PathBuf> {
    reloader.store().snapshot().path().map(Path::to_path_buf)
}

fn watch_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

/// Event paths come back absolute, so compare names and, when both have one, directories.
fn same_file(candidate: &Path, target: &Path) -> bool {
    if candidate.file_name().is_none() || candidate.file_name() != target.file_name() {
        return false;
    }
    match (candidate.parent(), target.parent()) {
        (Some(a), Some(b)) if a.is_absolute() && b.is_absolute() => same_dir(a, b),
        _ => true,
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
