//! Directory listing module
//!
//! The scanner never touches the filesystem directly. It goes through a
//! [`DirLister`], which returns the entries of one folder with their kind and
//! (for files) their size.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      Worker                          │
//! │  - One folder task at a time                        │
//! │  - Builds child records from the listing            │
//! └──────────────────────────┬──────────────────────────┘
//!                            │ read_dir(path)
//!                            ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                  DirLister (trait)                   │
//! │  - LocalLister: std::fs, symlinks not followed      │
//! │  - Folder error => whole listing fails              │
//! │  - Entry error  => only that entry fails            │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use folder_scan::listing::{DirLister, LocalLister};
//!
//! let lister = LocalLister::new();
//! for entry in lister.read_dir("/var/log").unwrap() {
//!     match entry {
//!         Ok(entry) => println!("{}: {:?} {}", entry.name, entry.kind, entry.size),
//!         Err(e) => eprintln!("skipped: {}", e),
//!     }
//! }
//! ```

mod local;
pub mod types;

pub use local::LocalLister;
pub use types::{join_path, root_name, EntryKind, ListedEntry};

use crate::error::ScanResult;

/// Source of folder listings for the scanner
///
/// Implementations must be shareable across worker threads. A failure to list
/// the folder itself is returned as the outer error; a failure on a single
/// entry is returned in place of that entry so the rest of the folder is kept.
pub trait DirLister: Send + Sync {
    /// List the direct children of the folder at `path`
    fn read_dir(&self, path: &str) -> ScanResult<Vec<ScanResult<ListedEntry>>>;
}

impl<T: DirLister + ?Sized> DirLister for std::sync::Arc<T> {
    fn read_dir(&self, path: &str) -> ScanResult<Vec<ScanResult<ListedEntry>>> {
        (**self).read_dir(path)
    }
}
