// Use log::* macros instead of println!/eprintln! for proper log level control
#![deny(clippy::print_stdout, clippy::print_stderr)]

//! Live, sorted directory views.
//!
//! A [`ListingSession`] owns one directory listing: it scans the directory on
//! a background thread, republishes whenever the directory changes on disk,
//! and annotates entries with a "recently opened" signal read from a per-tree
//! sidecar file. Consumers observe the current [`Stateful`] snapshot through
//! [`ListingSession::subscribe`], sort it with [`sort_entries`], and record
//! opens with [`ListingSession::record_opened`].
//!
//! Scanning is cancellable and supersedable: a reload cancels the in-flight
//! scan, and a superseded scan that completes anyway never overwrites a newer
//! result. Change notifications that arrive while nobody is observing are
//! deferred until an observer reattaches.

mod ignore_poison;

pub mod error;
pub mod listing;
pub mod recency;
pub mod stateful;
pub mod watcher;

pub use error::{ListingError, RecencyError, WatchError};
pub use listing::entry::{DirectorySnapshot, FileEntry, SkippedEntry};
pub use listing::session::{ListingSession, Observation};
pub use listing::sorting::{SortBy, SortOrder, SortSpec, compare, sort_entries};
pub use listing::source::{DirectorySource, FsDirectorySource};
pub use recency::{RecencyMap, SIDECAR_FILE_NAME};
pub use stateful::Stateful;
pub use watcher::{ChangeWatcher, DebouncedFsWatcher, WatchGuard};
