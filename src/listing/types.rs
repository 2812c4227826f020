//! Listing entry types

use std::path::Path;

/// Kind of a listed entry
///
/// Only directories are descended into. Everything else, symlinks included,
/// counts as a file with its own (non-followed) size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file, symlink, device, socket...
    File,
    /// Directory
    Directory,
}

impl EntryKind {
    /// Check if this is a directory
    pub fn is_dir(&self) -> bool {
        *self == EntryKind::Directory
    }

    /// Check if this is a file
    pub fn is_file(&self) -> bool {
        *self == EntryKind::File
    }
}

/// A single entry returned by a folder listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    /// Entry name (not full path)
    pub name: String,

    /// Entry kind
    pub kind: EntryKind,

    /// Size in bytes (always 0 for directories)
    pub size: i64,
}

impl ListedEntry {
    /// Create a file entry
    pub fn file(name: impl Into<String>, size: i64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
        }
    }

    /// Create a directory entry
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: 0,
        }
    }

    /// Check if this should be skipped (. or ..)
    pub fn is_special(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

/// Join a child name onto a parent path
pub fn join_path(parent: &str, name: &str) -> String {
    Path::new(parent).join(name).to_string_lossy().into_owned()
}

/// Name of the root folder: its last path segment, or the path itself for
/// roots like `/` that have none
pub fn root_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
