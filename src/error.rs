//! Error types for listing, recency bookkeeping, and watching.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure of one listing pass (the directory itself could not be
/// enumerated). Per-child read errors are not errors at this level; they
/// become [`crate::SkippedEntry`] records on the snapshot.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("failed to enumerate {}: {source}", path.display())]
    Enumeration { path: PathBuf, source: io::Error },
}

/// Failure of a recency sidecar read or write attempt.
///
/// These never escape the crate: recency tracking is strictly best-effort,
/// so every `RecencyError` is logged and swallowed before it can affect a
/// listing operation.
#[derive(Debug, Error)]
pub enum RecencyError {
    #[error("recency sidecar I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("{} is outside the recency sidecar's tree", path.display())]
    ForeignPath { path: PathBuf },
}

/// Failure to register a directory watch.
#[derive(Debug, Error)]
#[error("failed to watch directory: {0}")]
pub struct WatchError(#[from] pub notify::Error);
