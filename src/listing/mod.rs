//! Directory listing module - entry types, source seam, loader, sorting, session.

pub mod entry;
pub mod loader;
pub mod session;
pub mod sorting;
pub mod source;

pub use entry::{DirectorySnapshot, FileEntry, SkippedEntry};
pub use session::{ListingSession, Observation};
pub use sorting::{SortBy, SortOrder, SortSpec};
pub use source::{DirectorySource, FsDirectorySource};

#[cfg(test)]
mod mock_source;



#[cfg(test)]
mod sorting_test;
