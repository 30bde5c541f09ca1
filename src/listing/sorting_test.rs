//! Tests for the layered comparator.

use std::path::Path;

use chrono::NaiveDate;

use super::mock_source::mock_entry;
use super::sorting::{SortBy, SortOrder, SortSpec, sort_entries};
use crate::listing::entry::FileEntry;

fn at(y: i32, mo: u32, d: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn file(name: &str) -> FileEntry {
    mock_entry(Path::new("/t"), name, false)
}

fn dir(name: &str) -> FileEntry {
    mock_entry(Path::new("/t"), name, true)
}

fn names(entries: &[FileEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
}

fn spec(by: SortBy, order: SortOrder) -> SortSpec {
    SortSpec {
        by,
        order,
        directories_first: false,
    }
}

#[test]
fn name_ascending_puts_unimportant_prefixes_last() {
    let mut entries = vec![file("b.txt"), file(".hidden"), file("a.txt"), file("#draft")];
    sort_entries(&mut entries, &spec(SortBy::Name, SortOrder::Ascending));
    assert_eq!(names(&entries), ["a.txt", "b.txt", "#draft", ".hidden"]);
}

#[test]
fn name_ascending_uses_natural_order() {
    let mut entries = vec![file("img_10.png"), file("img_2.png"), file("Img_1.png")];
    sort_entries(&mut entries, &spec(SortBy::Name, SortOrder::Ascending));
    assert_eq!(names(&entries), ["Img_1.png", "img_2.png", "img_10.png"]);
}

#[test]
fn name_descending_reverses_the_whole_chain() {
    let mut entries = vec![file("b.txt"), file(".hidden"), file("a.txt")];
    sort_entries(&mut entries, &spec(SortBy::Name, SortOrder::Descending));
    assert_eq!(names(&entries), [".hidden", "b.txt", "a.txt"]);
}

#[test]
fn type_groups_by_extension_then_name() {
    let mut entries = vec![file("b.txt"), file("a.zip"), file("a.txt"), file("c.md")];
    sort_entries(&mut entries, &spec(SortBy::Type, SortOrder::Ascending));
    assert_eq!(names(&entries), ["c.md", "a.txt", "b.txt", "a.zip"]);
}

#[test]
fn type_compares_extensions_case_insensitively() {
    // An uppercase extension must not jump ahead of lowercase ones on byte
    // order ('T' < 'a' in ASCII).
    let mut upper = file("notes.txt");
    upper.extension = "TXT".to_string();
    let mut entries = vec![upper, file("a.jpg"), file("b.zip")];
    sort_entries(&mut entries, &spec(SortBy::Type, SortOrder::Ascending));
    assert_eq!(names(&entries), ["a.jpg", "notes.txt", "b.zip"]);
}

#[test]
fn size_ascending_breaks_ties_by_name() {
    let mut big = file("big.bin");
    big.size = 100;
    let mut small_b = file("b.bin");
    small_b.size = 1;
    let mut small_a = file("a.bin");
    small_a.size = 1;
    let mut entries = vec![big, small_b, small_a];
    sort_entries(&mut entries, &spec(SortBy::Size, SortOrder::Ascending));
    assert_eq!(names(&entries), ["a.bin", "b.bin", "big.bin"]);
}

#[test]
fn last_modified_descending_puts_newest_first() {
    let mut old = file("old.txt");
    old.modified_at = Some(at(2023, 1, 1));
    let mut new = file("new.txt");
    new.modified_at = Some(at(2024, 1, 1));
    let mut entries = vec![old, new];
    sort_entries(&mut entries, &spec(SortBy::LastModified, SortOrder::Descending));
    assert_eq!(names(&entries), ["new.txt", "old.txt"]);
}

#[test]
fn last_modified_ascending_means_most_recently_opened_first() {
    let mut x = file("x.txt");
    x.last_opened_at = Some(at(2023, 1, 1));
    let y = file("y.txt"); // never opened
    let mut z = file("z.txt");
    z.last_opened_at = Some(at(2024, 1, 1));
    let mut entries = vec![x, y, z];
    sort_entries(&mut entries, &spec(SortBy::LastModified, SortOrder::Ascending));
    assert_eq!(names(&entries), ["z.txt", "x.txt", "y.txt"]);
}

#[test]
fn last_opened_ties_fall_back_to_the_reversed_chain() {
    // Neither was ever opened, so both collapse onto the stand-in timestamp
    // and the name chain applies reversed.
    let mut entries = vec![file("a.txt"), file("b.txt")];
    sort_entries(&mut entries, &spec(SortBy::LastModified, SortOrder::Ascending));
    assert_eq!(names(&entries), ["b.txt", "a.txt"]);
}

#[test]
fn directories_first_holds_for_every_criterion_and_order() {
    for by in [SortBy::Name, SortBy::Type, SortBy::Size, SortBy::LastModified] {
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let mut entries = vec![file("a.txt"), dir("z_dir"), file(".h"), dir("a_dir")];
            entries[1].last_opened_at = Some(at(2020, 5, 5));
            sort_entries(
                &mut entries,
                &SortSpec {
                    by,
                    order,
                    directories_first: true,
                },
            );
            let first_file = entries.iter().position(|e| !e.is_directory).unwrap();
            assert!(
                entries[first_file..].iter().all(|e| !e.is_directory),
                "by={by:?} order={order:?}: {:?}",
                names(&entries)
            );
        }
    }
}

#[test]
fn directories_sort_among_themselves_by_the_chain() {
    let mut entries = vec![dir("beta"), file("a.txt"), dir("alpha")];
    sort_entries(
        &mut entries,
        &SortSpec {
            by: SortBy::Name,
            order: SortOrder::Ascending,
            directories_first: true,
        },
    );
    assert_eq!(names(&entries), ["alpha", "beta", "a.txt"]);
}

#[test]
fn sort_spec_serializes_camel_case() {
    let spec = SortSpec {
        by: SortBy::LastModified,
        order: SortOrder::Descending,
        directories_first: true,
    };
    let json = serde_json::to_string(&spec).unwrap();
    assert_eq!(
        json,
        r#"{"by":"lastModified","order":"descending","directoriesFirst":true}"#
    );
    let back: SortSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(back, spec);
}
