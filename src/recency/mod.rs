//! Recency sidecar store: discovery, parsing, atomic rewrite, and the
//! session-scoped cache.
//!
//! A sidecar file shared across a directory tree maps relative paths to
//! last-opened timestamps. Everything here is best-effort: a failed read or
//! write is logged and swallowed, it must never affect the listing that
//! triggered it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDateTime};

use crate::error::RecencyError;
use crate::ignore_poison::IgnorePoison;

/// Well-known sidecar filename, discovered by a bounded upward search.
pub const SIDECAR_FILE_NAME: &str = "RIV_FILE_LAST_OPENED_TIME_MAP.txt";

/// Fixed-width timestamp pattern used inside the sidecar.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Five literal spaces between the timestamp and the key.
const KEY_SEPARATOR: &str = "     ";

/// Timestamp-derived suffix for temp filenames, to avoid collisions during
/// the write-then-rename replace.
const TEMP_SUFFIX_FORMAT: &str = "%Y%m%d%H%M%S";

/// How many directory levels (self, parent, grandparent) are probed for the
/// sidecar.
const DISCOVERY_LEVELS: usize = 3;

// ============================================================================
// Recency map
// ============================================================================

/// Mapping from a `/`-separated relative path to a last-opened timestamp.
///
/// Keys keep their first-occurrence order; inserting an existing key
/// overwrites the value at the key's original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecencyMap {
    entries: Vec<(String, NaiveDateTime)>,
}

impl RecencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<NaiveDateTime> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, at)| *at)
    }

    pub fn insert(&mut self, key: impl Into<String>, at: NaiveDateTime) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = at;
        } else {
            self.entries.push((key, at));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NaiveDateTime)> {
        self.entries.iter().map(|(k, at)| (k.as_str(), *at))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses sidecar text. Lines whose timestamp fails to parse or whose key
    /// is missing are skipped individually; the parse as a whole never fails.
    pub fn parse(text: &str) -> Self {
        let mut map = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((stamp, key)) = line.split_once(KEY_SEPARATOR) else {
                log::warn!("skipping recency line without separator: {line:?}");
                continue;
            };
            if key.is_empty() {
                log::warn!("skipping recency line without key: {line:?}");
                continue;
            }
            match NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT) {
                Ok(at) => map.insert(key, at),
                Err(e) => log::warn!("skipping recency line with bad timestamp {line:?}: {e}"),
            }
        }
        map
    }

    /// Serializes the full map back to sidecar text.
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|(key, at)| format!("{}{KEY_SEPARATOR}{key}", at.format(TIMESTAMP_FORMAT)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// Discovery and I/O
// ============================================================================

/// Probes `dir`, its parent, and its grandparent for the sidecar file and
/// returns the nearest one that exists.
pub fn find_sidecar(dir: &Path) -> Option<PathBuf> {
    let mut probe = dir.to_path_buf();
    for _ in 0..DISCOVERY_LEVELS {
        let candidate = probe.join(SIDECAR_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !probe.pop() {
            break;
        }
    }
    None
}

/// Loads the recency map governing `dir`, returning the map and the sidecar
/// path. `None` when no sidecar exists for this tree or reading it failed
/// (failures are logged, never propagated).
pub fn load(dir: &Path) -> Option<(RecencyMap, PathBuf)> {
    let sidecar = find_sidecar(dir)?;
    log::info!("reading recency map {}", sidecar.display());
    match fs::read_to_string(&sidecar) {
        Ok(text) => Some((RecencyMap::parse(&text), sidecar)),
        Err(e) => {
            log::warn!("failed to read recency map {}: {e}", sidecar.display());
            None
        }
    }
}

/// Records that `file` was opened at `opened_at`, best-effort.
///
/// The sidecar is discovered from `start_dir`, re-read fresh from disk,
/// updated, and atomically replaced via a temp file in the same directory.
/// Recording only ever updates an existing sidecar; when none is found this
/// is a no-op. Any failure is logged and swallowed.
pub fn record_opened(start_dir: &Path, file: &Path, opened_at: NaiveDateTime) {
    if let Err(e) = try_record_opened(start_dir, file, opened_at) {
        log::warn!("failed to record open of {}: {e}", file.display());
    }
}

fn try_record_opened(
    start_dir: &Path,
    file: &Path,
    opened_at: NaiveDateTime,
) -> Result<(), RecencyError> {
    let Some(sidecar) = find_sidecar(start_dir) else {
        return Ok(());
    };
    let sidecar_dir = sidecar.parent().unwrap_or(Path::new("")).to_path_buf();

    // Always re-read from disk rather than trusting any cache, to reduce
    // races with concurrent external writers.
    let mut map = RecencyMap::parse(&fs::read_to_string(&sidecar)?);

    let key = relative_key(file, &sidecar_dir).ok_or_else(|| RecencyError::ForeignPath {
        path: file.to_path_buf(),
    })?;
    map.insert(key, opened_at);

    log::info!("writing recency map {}", sidecar.display());
    let temp = temp_sidecar_path(&sidecar, Local::now().naive_local());
    fs::write(&temp, map.serialize())?;
    if let Err(e) = fs::rename(&temp, &sidecar) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}

/// Temp filename for the atomic replace: `<stem>.<timestamp>.txt` next to the
/// sidecar.
fn temp_sidecar_path(sidecar: &Path, now: NaiveDateTime) -> PathBuf {
    let stem = sidecar
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recency".to_string());
    sidecar.with_file_name(format!("{stem}.{}.txt", now.format(TEMP_SUFFIX_FORMAT)))
}

/// Expresses `path` relative to `base` as a `/`-separated key, or `None` when
/// `path` is not under `base`.
pub(crate) fn relative_key(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

// ============================================================================
// Session-scoped cache
// ============================================================================

/// A loaded recency view: the map plus the directory its keys are relative
/// to.
#[derive(Debug, Clone)]
pub struct CachedRecency {
    pub map: Arc<RecencyMap>,
    pub sidecar_dir: PathBuf,
}

/// Memoized recency view for one listing session.
///
/// The first `get_or_load` reads the sidecar synchronously; later calls
/// return the cached view until `invalidate` clears it (on explicit reload
/// and session teardown).
#[derive(Debug, Default)]
pub struct RecencyCache {
    // Outer Option: loaded yet; inner Option: sidecar found.
    state: Mutex<Option<Option<CachedRecency>>>,
}

impl RecencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&self, dir: &Path) -> Option<CachedRecency> {
        let mut state = self.state.lock_ignore_poison();
        if state.is_none() {
            *state = Some(load(dir).map(|(map, sidecar)| CachedRecency {
                map: Arc::new(map),
                sidecar_dir: sidecar.parent().unwrap_or(Path::new("")).to_path_buf(),
            }));
        }
        state.as_ref().and_then(|cached| cached.clone())
    }

    pub fn invalidate(&self) {
        *self.state.lock_ignore_poison() = None;
    }
}
