//! Folder snapshots
//!
//! A snapshot is the size-annotated tree produced by one scan. Nodes live in
//! an arena ([`Snapshot`]) and refer to each other by [`FolderId`]; the parent
//! link is an id, never an owning reference.
//!
//! # Lifecycle
//!
//! ```text
//!   scan (workers fill folder records)
//!        │
//!        ▼
//!   assemble arena ──► aggregate() ──► frozen snapshot ──► save / diff
//! ```
//!
//! After [`Snapshot::aggregate`] every folder satisfies
//! `size == files_size + subfolders_size`, recursively up to the root.

mod aggregate;
pub mod model;
pub mod store;

pub use model::{FileEntry, Folder, FolderId, FsData, Snapshot};
pub use store::{load_snapshot, save_snapshot, StoredFile, StoredFolder};
