//! One snapshot pass: enumerate children, attach recency annotations,
//! collect skipped entries.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::NaiveDateTime;

use crate::error::ListingError;
use crate::listing::entry::{DirectorySnapshot, FileEntry};
use crate::listing::source::DirectorySource;
use crate::recency::{RecencyCache, RecencyMap, relative_key};

/// Runs one listing pass over `dir`. Blocking; call on a worker thread.
///
/// Cancellation is cooperative: the flag is checked between children and a
/// cancelled pass stops enumerating promptly. The caller is responsible for
/// discarding the result of a cancelled or superseded pass.
pub(crate) fn load_snapshot(
    dir: &Path,
    source: &dyn DirectorySource,
    recency: &RecencyCache,
    cancel: &Arc<AtomicBool>,
    generation: u64,
) -> Result<DirectorySnapshot, ListingError> {
    let start = Instant::now();

    // May block on the first call of the session to read the sidecar.
    let recency_view = recency.get_or_load(dir);

    let children = source
        .list_children(dir)
        .map_err(|source| ListingError::Enumeration {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut entries = Vec::new();
    let mut skipped = Vec::new();
    for child in children {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        match child {
            Ok(mut entry) => {
                if let Some(cached) = &recency_view {
                    annotate_recency(&mut entry, &cached.map, &cached.sidecar_dir);
                }
                entries.push(entry);
            }
            Err(skip) => {
                log::warn!(
                    "skipping unreadable entry {}: {}",
                    skip.path.display(),
                    skip.reason
                );
                skipped.push(skip);
            }
        }
    }

    log::debug!(
        "load_snapshot: dir={}, generation={}, entries={}, skipped={}, total={}ms",
        dir.display(),
        generation,
        entries.len(),
        skipped.len(),
        start.elapsed().as_millis()
    );

    Ok(DirectorySnapshot {
        generation,
        entries,
        skipped,
    })
}

/// Attaches `last_opened_at` and `recent_summary` to one entry, given the
/// recency map whose keys are relative to `sidecar_dir`.
pub(crate) fn annotate_recency(entry: &mut FileEntry, map: &RecencyMap, sidecar_dir: &Path) {
    let Some(rel_key) = relative_key(&entry.path, sidecar_dir) else {
        return;
    };

    // Exact hit: the entry itself was opened.
    if let Some(at) = map.get(&rel_key) {
        entry.last_opened_at = Some(at);
        entry.recent_summary = String::new();
        return;
    }

    // Directory entry: gather recorded opens inside its subtree.
    let prefix = format!("{rel_key}/");
    let mut opens: Vec<(NaiveDateTime, &str)> = map
        .iter()
        .filter_map(|(key, at)| key.strip_prefix(prefix.as_str()).map(|suffix| (at, suffix)))
        .collect();
    if opens.is_empty() {
        return;
    }
    opens.sort_by(|a, b| b.0.cmp(&a.0));

    entry.last_opened_at = Some(opens[0].0);
    let recent: Vec<&str> = opens.iter().take(3).map(|(_, suffix)| *suffix).collect();
    entry.recent_summary = format!("Last: {}", recent.join(", "));
}
