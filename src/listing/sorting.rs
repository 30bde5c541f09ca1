//! Layered comparator over file entries.
//!
//! Pure functions; entries must already carry their recency annotation for
//! the last-opened sort mode to work (see `loader`).

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::listing::entry::FileEntry;

/// Names starting with these sort after everything else. Same prefixes
/// Nautilus treats as unimportant.
const NAME_UNIMPORTANT_PREFIXES: [&str; 2] = [".", "#"];

/// Stand-in timestamp for entries with no recorded open, far enough in the
/// past to sort after any real open.
static NEVER_OPENED: LazyLock<NaiveDateTime> = LazyLock::new(|| {
    NaiveDate::from_ymd_opt(2000, 2, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
});

/// Criterion to sort file entries by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Name,
    Type,
    Size,
    LastModified,
}

/// Sort order (ascending or descending).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Full sort specification, supplied per sort call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub by: SortBy,
    pub order: SortOrder,
    pub directories_first: bool,
}

/// Compares two entries under `spec`. Total order.
pub fn compare(a: &FileEntry, b: &FileEntry, spec: &SortSpec) -> Ordering {
    if spec.directories_first {
        // Directories before non-directories, the rest of the chain breaks
        // ties within each group.
        let group = b.is_directory.cmp(&a.is_directory);
        if group != Ordering::Equal {
            return group;
        }
    }
    compare_within_group(a, b, spec)
}

/// Sorts entries in place under `spec`.
pub fn sort_entries(entries: &mut [FileEntry], spec: &SortSpec) {
    entries.sort_by(|a, b| compare(a, b, spec));
}

fn compare_within_group(a: &FileEntry, b: &FileEntry, spec: &SortSpec) -> Ordering {
    let chain = keyed_chain(a, b, spec.by);

    // Intentional repurposing, not a bug: "ascending by modification time"
    // actually means "most recently opened first". Entries without a recorded
    // open all collapse onto the NEVER_OPENED stand-in and fall back to the
    // reversed chain.
    if spec.by == SortBy::LastModified && spec.order == SortOrder::Ascending {
        let a_opened = a.last_opened_at.unwrap_or(*NEVER_OPENED);
        let b_opened = b.last_opened_at.unwrap_or(*NEVER_OPENED);
        return b_opened.cmp(&a_opened).then(chain.reverse());
    }

    match spec.order {
        SortOrder::Ascending => chain,
        SortOrder::Descending => chain.reverse(),
    }
}

/// The comparator chain for `by`, before order and directory grouping are
/// applied: criterion first, unimportant-prefix-then-collation as tie-break.
fn keyed_chain(a: &FileEntry, b: &FileEntry, by: SortBy) -> Ordering {
    let primary = match by {
        SortBy::Name => Ordering::Equal,
        // Fold case here rather than trusting the source to have lowercased;
        // entries can also arrive deserialized from elsewhere.
        SortBy::Type => {
            alphanumeric_sort::compare_str(a.extension.to_lowercase(), b.extension.to_lowercase())
        }
        SortBy::Size => a.size.cmp(&b.size),
        SortBy::LastModified => a.modified_at.cmp(&b.modified_at),
    };
    primary.then_with(|| base_chain(a, b))
}

fn base_chain(a: &FileEntry, b: &FileEntry) -> Ordering {
    has_unimportant_prefix(&a.name)
        .cmp(&has_unimportant_prefix(&b.name))
        .then_with(|| alphanumeric_sort::compare_str(&a.collation_key, &b.collation_key))
}

fn has_unimportant_prefix(name: &str) -> bool {
    NAME_UNIMPORTANT_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}
