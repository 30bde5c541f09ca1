//! Scriptable directory source for tests.

use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::ignore_poison::IgnorePoison;
use crate::listing::entry::{FileEntry, SkippedEntry};
use crate::listing::source::DirectorySource;

/// Builds a minimal entry under `dir` for tests.
pub(crate) fn mock_entry(dir: &Path, name: &str, is_directory: bool) -> FileEntry {
    FileEntry {
        name: name.to_string(),
        path: dir.join(name),
        extension: Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default(),
        collation_key: name.to_lowercase(),
        size: 0,
        is_directory,
        modified_at: None,
        last_opened_at: None,
        recent_summary: String::new(),
    }
}

/// One scripted response for a single `list_children` call.
pub(crate) struct Script {
    pub children: Result<Vec<Result<FileEntry, SkippedEntry>>, io::ErrorKind>,
    /// When set, the call blocks until the paired sender fires or drops.
    pub gate: Option<Receiver<()>>,
    /// When set, signals the test that the call has started (before any
    /// gate blocking).
    pub started: Option<Sender<()>>,
}

impl Script {
    pub fn ok(children: Vec<Result<FileEntry, SkippedEntry>>) -> Self {
        Self {
            children: Ok(children),
            gate: None,
            started: None,
        }
    }

    pub fn fail(kind: io::ErrorKind) -> Self {
        Self {
            children: Err(kind),
            gate: None,
            started: None,
        }
    }

    pub fn gated(mut self, gate: Receiver<()>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn notifying(mut self, started: Sender<()>) -> Self {
        self.started = Some(started);
        self
    }
}

/// Directory source that answers from a script queue, falling back to a fixed
/// child list. Counts calls so tests can assert how many scans ran.
#[derive(Default)]
pub(crate) struct MockSource {
    queue: Mutex<VecDeque<Script>>,
    fallback: Mutex<Vec<Result<FileEntry, SkippedEntry>>>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fallback(&self, children: Vec<Result<FileEntry, SkippedEntry>>) {
        *self.fallback.lock_ignore_poison() = children;
    }

    pub fn push_script(&self, script: Script) {
        self.queue.lock_ignore_poison().push_back(script);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DirectorySource for MockSource {
    fn list_children(
        &self,
        _dir: &Path,
    ) -> io::Result<Box<dyn Iterator<Item = Result<FileEntry, SkippedEntry>> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Pop under a short-lived lock; a gated script must not block other
        // concurrent scans on the queue mutex.
        let script = self.queue.lock_ignore_poison().pop_front();
        match script {
            Some(script) => {
                if let Some(started) = script.started {
                    let _ = started.send(());
                }
                if let Some(gate) = script.gate {
                    // Blocks until the test releases (or drops) the sender.
                    let _ = gate.recv();
                }
                match script.children {
                    Ok(children) => Ok(Box::new(children.into_iter())),
                    Err(kind) => Err(io::Error::new(kind, "scripted enumeration failure")),
                }
            }
            None => Ok(Box::new(
                self.fallback.lock_ignore_poison().clone().into_iter(),
            )),
        }
    }
}
