//! Local filesystem lister backed by `std::fs`

use crate::error::{ScanError, ScanResult};
use crate::listing::types::{join_path, EntryKind, ListedEntry};
use crate::listing::DirLister;
use std::fs;
use tracing::trace;

/// Lists folders on the local filesystem
///
/// File types and sizes come from `symlink_metadata`, so links are reported
/// as files of their own size and never followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalLister;

impl LocalLister {
    pub fn new() -> Self {
        Self
    }
}

impl DirLister for LocalLister {
    fn read_dir(&self, path: &str) -> ScanResult<Vec<ScanResult<ListedEntry>>> {
        let dir = fs::read_dir(path).map_err(|e| ScanError::from_io(path, &e))?;

        let mut entries = Vec::new();
        for item in dir {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    entries.push(Err(ScanError::from_io(path, &e)));
                    continue;
                }
            };

            let name = item.file_name().to_string_lossy().into_owned();
            let entry = item
                .file_type()
                .and_then(|file_type| {
                    if file_type.is_dir() {
                        Ok(ListedEntry::dir(name.clone()))
                    } else {
                        let meta = item.metadata()?;
                        Ok(ListedEntry {
                            name: name.clone(),
                            kind: EntryKind::File,
                            size: i64::try_from(meta.len()).unwrap_or(i64::MAX),
                        })
                    }
                })
                .map_err(|e| ScanError::stat_failed(&join_path(path, &name), &e));

            entries.push(entry);
        }

        trace!(path = %path, entries = entries.len(), "Directory listed");
        Ok(entries)
    }
}
