//! Listing value types.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One directory child, created fresh on every scan and immutable once
/// published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    /// Lowercased extension, empty when the name has none.
    pub extension: String,
    /// Opaque ordering key for name comparisons (lowercased name, compared
    /// with natural ordering by the sort engine).
    pub collation_key: String,
    pub size: u64,
    pub is_directory: bool,
    pub modified_at: Option<NaiveDateTime>,
    /// When this entry (or, for directories, something in its subtree) was
    /// last opened according to the recency sidecar.
    pub last_opened_at: Option<NaiveDateTime>,
    /// Human-readable summary of recent opens inside a directory entry,
    /// `"Last: a, b, c"`, or empty.
    pub recent_summary: String,
}

/// A child omitted from a snapshot because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: String,
}

/// One immutable listing result for a directory at a point in time.
///
/// `generation` is the monotonically increasing identity of the scan that
/// produced this snapshot; each reload yields a wholly new snapshot.
/// Entries are in enumeration order; sorting is a separate step, see
/// [`crate::sort_entries`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySnapshot {
    pub generation: u64,
    pub entries: Vec<FileEntry>,
    pub skipped: Vec<SkippedEntry>,
}
