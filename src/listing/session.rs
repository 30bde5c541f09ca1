//! Change-reactive listing session.
//!
//! Owns one loader run at a time, supersedes it on new triggers, bridges
//! directory-change notifications into reloads, and defers refreshes that
//! arrive while nobody is observing.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::NaiveDateTime;
use tokio::sync::watch;

use crate::ignore_poison::IgnorePoison;
use crate::listing::entry::DirectorySnapshot;
use crate::listing::loader::load_snapshot;
use crate::listing::source::DirectorySource;
use crate::recency::{self, RecencyCache};
use crate::stateful::Stateful;
use crate::watcher::{ChangeWatcher, WatchGuard};

/// One live listing of one directory.
///
/// Starts loading immediately on creation. Dropping the session cancels any
/// in-flight scan and releases the directory watch.
pub struct ListingSession {
    inner: Arc<SessionInner>,
    watch_guard: Option<Box<dyn WatchGuard>>,
}

struct SessionInner {
    dir: PathBuf,
    source: Arc<dyn DirectorySource>,
    recency: RecencyCache,
    tx: watch::Sender<Stateful<DirectorySnapshot>>,
    /// Generation of the latest started run. The publish step compares a
    /// run's generation against this and discards superseded results.
    latest_generation: AtomicU64,
    /// Cancellation flag of the in-flight run, if any.
    in_flight: Mutex<Option<Arc<AtomicBool>>>,
    observers: Mutex<ObserverState>,
}

struct ObserverState {
    active: usize,
    changed_while_inactive: bool,
}

impl ListingSession {
    /// Opens a session for `dir`: starts the initial scan and registers a
    /// directory watch. A watch registration failure is logged and tolerated;
    /// the listing still works, just without automatic refresh.
    pub fn open(
        dir: impl Into<PathBuf>,
        source: Arc<dyn DirectorySource>,
        watcher: &dyn ChangeWatcher,
    ) -> Self {
        let dir = dir.into();
        let (tx, _) = watch::channel(Stateful::Loading(None));
        let inner = Arc::new(SessionInner {
            dir,
            source,
            recency: RecencyCache::new(),
            tx,
            latest_generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            observers: Mutex::new(ObserverState {
                active: 0,
                changed_while_inactive: false,
            }),
        });

        inner.start_load();

        let weak = Arc::downgrade(&inner);
        let watch_guard = match watcher.watch(
            &inner.dir,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_directory_changed();
                }
            }),
        ) {
            Ok(guard) => Some(guard),
            Err(e) => {
                log::warn!("failed to watch {}: {e}", inner.dir.display());
                None
            }
        };

        Self { inner, watch_guard }
    }

    /// Explicit reload. Never deferred, and re-reads the recency sidecar (so
    /// a preceding [`Self::record_opened`] becomes visible).
    pub fn reload(&self) {
        self.inner.recency.invalidate();
        self.inner.start_load();
    }

    /// Attaches an observer to the listing state. If a change notification
    /// arrived while no observer was attached, this triggers exactly one
    /// catch-up reload.
    pub fn subscribe(&self) -> Observation {
        let rx = self.inner.tx.subscribe();
        let needs_reload = {
            let mut observers = self.inner.observers.lock_ignore_poison();
            observers.active += 1;
            if observers.active == 1 && observers.changed_while_inactive {
                observers.changed_while_inactive = false;
                true
            } else {
                false
            }
        };
        if needs_reload {
            log::debug!(
                "observer reattached to {} with pending refresh, reloading",
                self.inner.dir.display()
            );
            self.inner.start_load();
        }
        Observation {
            rx,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Records that `file` was opened, on a worker thread, best-effort.
    ///
    /// Does not reload by itself; call [`Self::reload`] when the new ordering
    /// should become visible.
    pub fn record_opened(&self, file: impl Into<PathBuf>, opened_at: NaiveDateTime) {
        let dir = self.inner.dir.clone();
        let file = file.into();
        let spawned = thread::Builder::new()
            .name("dirview-recency".into())
            .spawn(move || recency::record_opened(&dir, &file, opened_at));
        if let Err(e) = spawned {
            log::warn!("failed to spawn recency writer: {e}");
        }
    }

    /// The directory this session lists.
    pub fn dir(&self) -> &std::path::Path {
        &self.inner.dir
    }
}

impl Drop for ListingSession {
    fn drop(&mut self) {
        // Release the watch first: a notification racing teardown must not
        // start a load after the cancel below.
        self.watch_guard.take();
        if let Some(cancel) = self.inner.in_flight.lock_ignore_poison().take() {
            cancel.store(true, Ordering::Relaxed);
        }
        self.inner.recency.invalidate();
    }
}

impl SessionInner {
    /// A change was observed on disk. Reload now if anyone is watching,
    /// otherwise remember that a refresh is due.
    fn on_directory_changed(self: &Arc<Self>) {
        let should_load = {
            let mut observers = self.observers.lock_ignore_poison();
            if observers.active == 0 {
                observers.changed_while_inactive = true;
                false
            } else {
                true
            }
        };
        if should_load {
            log::debug!("{} changed on disk, reloading", self.dir.display());
            self.start_load();
        } else {
            log::debug!(
                "{} changed while inactive, deferring refresh",
                self.dir.display()
            );
        }
    }

    /// Cancels the in-flight run (if any), publishes `Loading(previous)`,
    /// and starts a new scan on a worker thread.
    fn start_load(self: &Arc<Self>) {
        let generation = self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = Arc::new(AtomicBool::new(false));
        if let Some(superseded) = self
            .in_flight
            .lock_ignore_poison()
            .replace(Arc::clone(&cancel))
        {
            superseded.store(true, Ordering::Relaxed);
        }

        self.tx.send_modify(|state| {
            let previous = state.data().cloned();
            *state = Stateful::Loading(previous);
        });

        let inner = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("dirview-load".into())
            .spawn(move || {
                let result = load_snapshot(
                    &inner.dir,
                    inner.source.as_ref(),
                    &inner.recency,
                    &cancel,
                    generation,
                );
                if cancel.load(Ordering::Relaxed) {
                    log::debug!("run {generation} cancelled, discarding result");
                    return;
                }
                inner.publish(generation, result);
            });
        if let Err(e) = spawned {
            log::warn!("failed to spawn load thread: {e}");
        }
    }

    /// Publishes one run's result, unless a newer run has started since. The
    /// generation check happens inside the sender's critical section, so a
    /// stale run racing a fresh one can never overwrite the fresh result.
    fn publish(
        &self,
        generation: u64,
        result: Result<DirectorySnapshot, crate::error::ListingError>,
    ) {
        let mut result = Some(result);
        let published = self.tx.send_if_modified(|state| {
            if self.latest_generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            let Some(result) = result.take() else {
                return false;
            };
            let previous = state.data().cloned();
            *state = match result {
                Ok(snapshot) => Stateful::Success(snapshot),
                Err(error) => Stateful::Failure {
                    previous,
                    error: Arc::new(error),
                },
            };
            true
        });
        if !published {
            log::debug!("run {generation} superseded, discarding result");
        }
    }
}

/// Live handle onto a session's listing state.
///
/// Holding an `Observation` marks the session as actively observed; dropping
/// the last one lets the session defer change-driven refreshes until a new
/// observer attaches.
pub struct Observation {
    rx: watch::Receiver<Stateful<DirectorySnapshot>>,
    inner: Arc<SessionInner>,
}

impl Observation {
    /// The current listing state.
    pub fn current(&self) -> Stateful<DirectorySnapshot> {
        self.rx.borrow().clone()
    }

    /// Waits until the state changes. Errors when the session is gone.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        let mut observers = self.inner.observers.lock_ignore_poison();
        observers.active = observers.active.saturating_sub(1);
    }
}
