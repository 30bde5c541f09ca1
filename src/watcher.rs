//! Change-watch seam and the debounced file system implementation.

use std::path::Path;
use std::time::Duration;

use notify_debouncer_full::{
    DebounceEventResult, Debouncer, RecommendedCache, new_debouncer,
    notify::{RecommendedWatcher, RecursiveMode},
};

use crate::error::WatchError;

/// Default debounce window for coalescing bursts of change events.
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Handle keeping one directory watch alive; dropping it stops the watch.
pub trait WatchGuard: Send {}

/// Source of directory-change notifications. This crate only consumes
/// notifications; `on_change` may be called from an arbitrary thread.
pub trait ChangeWatcher {
    fn watch(
        &self,
        path: &Path,
        on_change: Box<dyn Fn() + Send + Sync>,
    ) -> Result<Box<dyn WatchGuard>, WatchError>;
}

/// Real watcher over `notify-debouncer-full`, non-recursive (immediate
/// children only).
pub struct DebouncedFsWatcher {
    debounce: Duration,
}

impl DebouncedFsWatcher {
    pub fn new() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        Self { debounce }
    }
}

impl Default for DebouncedFsWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeWatcher for DebouncedFsWatcher {
    fn watch(
        &self,
        path: &Path,
        on_change: Box<dyn Fn() + Send + Sync>,
    ) -> Result<Box<dyn WatchGuard>, WatchError> {
        let mut debouncer = new_debouncer(
            self.debounce,
            None, // No tick rate limit
            move |result: DebounceEventResult| {
                match result {
                    Ok(_events) => on_change(),
                    Err(_errors) => {
                        // Watcher errors often mean the watched directory was
                        // deleted. Signal a change; the reload surfaces the
                        // real state.
                        on_change()
                    }
                }
            },
        )?;
        debouncer.watch(path, RecursiveMode::NonRecursive)?;
        Ok(Box::new(DebouncedWatchGuard {
            _debouncer: debouncer,
        }))
    }
}

struct DebouncedWatchGuard {
    // Must be held to keep watching.
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl WatchGuard for DebouncedWatchGuard {}
