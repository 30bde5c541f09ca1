//! Directory enumeration seam and the real file system implementation.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime};

use crate::listing::entry::{FileEntry, SkippedEntry};

/// Source of directory children with per-child metadata.
///
/// Per-child failures are data, not errors: an unreadable child yields a
/// [`SkippedEntry`] and enumeration continues. Only a failure to open the
/// directory itself is an `Err` at this level.
pub trait DirectorySource: Send + Sync {
    fn list_children(
        &self,
        dir: &Path,
    ) -> io::Result<Box<dyn Iterator<Item = Result<FileEntry, SkippedEntry>> + Send + '_>>;
}

/// Real file system source backed by `std::fs`.
pub struct FsDirectorySource;

impl DirectorySource for FsDirectorySource {
    fn list_children(
        &self,
        dir: &Path,
    ) -> io::Result<Box<dyn Iterator<Item = Result<FileEntry, SkippedEntry>> + Send + '_>> {
        let dir_owned = dir.to_path_buf();
        let read_dir = fs::read_dir(dir)?;
        Ok(Box::new(read_dir.map(move |item| match item {
            Ok(dir_entry) => read_entry(&dir_entry).map_err(|e| SkippedEntry {
                path: dir_entry.path(),
                reason: e.to_string(),
            }),
            // An error surfaced mid-enumeration has no per-child path.
            Err(e) => Err(SkippedEntry {
                path: dir_owned.clone(),
                reason: e.to_string(),
            }),
        })))
    }
}

/// Builds a `FileEntry` from one `read_dir` entry. Recency fields stay at
/// their defaults; the loader annotates them.
fn read_entry(entry: &fs::DirEntry) -> io::Result<FileEntry> {
    let path = entry.path();
    let file_type = entry.file_type()?;

    // For symlinks, stat the link itself but report a link to a directory as
    // a directory so it lists and sorts like one.
    let metadata = if file_type.is_symlink() {
        fs::symlink_metadata(&path)?
    } else {
        entry.metadata()?
    };
    let target_is_dir =
        file_type.is_symlink() && fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false);

    let name = entry.file_name().to_string_lossy().into_owned();
    Ok(FileEntry {
        extension: extension_of(&name),
        collation_key: name.to_lowercase(),
        size: metadata.len(),
        is_directory: metadata.is_dir() || target_is_dir,
        modified_at: metadata.modified().ok().map(to_local_naive),
        last_opened_at: None,
        recent_summary: String::new(),
        name,
        path,
    })
}

/// Extracts the lowercased extension, empty when there is none.
fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn to_local_naive(time: std::time::SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}
