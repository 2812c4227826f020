//! JSON persistence for snapshots
//!
//! On disk a snapshot is a nested tree:
//!
//! ```text
//! folder: {name, path, size, filesSize, subfoldersSize, subs: [folder...], files: [file...]}
//! file:   {name, path, size}
//! ```
//!
//! Zero sizes and empty lists are omitted on write and defaulted on read. The
//! parent link is not stored; it is rebuilt from nesting on load.

use crate::error::{SnapshotError, SnapshotResult};
use crate::snapshot::model::{FolderId, Snapshot};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Serialized form of a folder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredFolder {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(skip_serializing_if = "is_zero")]
    pub size: i64,

    #[serde(skip_serializing_if = "is_zero")]
    pub files_size: i64,

    #[serde(skip_serializing_if = "is_zero")]
    pub subfolders_size: i64,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subs: Vec<StoredFolder>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<StoredFile>,
}

/// Serialized form of a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredFile {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(skip_serializing_if = "is_zero")]
    pub size: i64,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

impl Snapshot {
    /// Convert to the nested on-disk form
    pub fn to_stored(&self) -> StoredFolder {
        self.stored_folder(self.root_id())
    }

    fn stored_folder(&self, id: FolderId) -> StoredFolder {
        let folder = self.folder(id);
        StoredFolder {
            name: folder.data.name.clone(),
            path: folder.data.path.clone(),
            size: folder.data.size,
            files_size: folder.files_size,
            subfolders_size: folder.subfolders_size,
            subs: folder
                .subfolders
                .iter()
                .map(|&child| self.stored_folder(child))
                .collect(),
            files: folder
                .files
                .iter()
                .map(|f| StoredFile {
                    name: f.name.clone(),
                    path: f.path.clone(),
                    size: f.size,
                })
                .collect(),
        }
    }

    /// Build an arena from the nested on-disk form
    ///
    /// Parent ids are rebuilt from nesting, file sizes are re-summed into
    /// `files_size` and the tree is re-aggregated, so stored folder sizes are
    /// recomputed rather than trusted.
    pub fn from_stored(root: StoredFolder) -> Self {
        let mut snapshot = Snapshot::new(root.name, root.path);
        let mut stack = vec![(snapshot.root_id(), root.subs, root.files)];

        while let Some((id, subs, files)) = stack.pop() {
            for file in files {
                snapshot.add_file_at(id, file.name, file.path, file.size);
            }
            for sub in subs {
                let child = snapshot.add_folder_at(id, sub.name, sub.path);
                stack.push((child, sub.subs, sub.files));
            }
        }

        snapshot.aggregate();
        snapshot
    }
}

/// Read a snapshot from a JSON file
pub fn load_snapshot(path: &Path) -> SnapshotResult<Snapshot> {
    debug!(path = %path.display(), "Loading snapshot");

    let file = fs::File::open(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_err = |source: serde_json::Error| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    };

    // Folder nesting is unbounded; grow the stack instead of capping depth
    let mut de = serde_json::Deserializer::from_reader(BufReader::new(file));
    de.disable_recursion_limit();
    let stored = StoredFolder::deserialize(serde_stacker::Deserializer::new(&mut de))
        .map_err(parse_err)?;
    de.end().map_err(parse_err)?;

    let snapshot = Snapshot::from_stored(stored);
    info!(
        path = %path.display(),
        folders = snapshot.folder_count(),
        files = snapshot.file_count(),
        "Snapshot loaded"
    );
    Ok(snapshot)
}

/// Write a snapshot to a JSON file
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> SnapshotResult<()> {
    let write_err = |source: std::io::Error| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &snapshot.to_stored())?;
    writer.flush().map_err(write_err)?;

    info!(path = %path.display(), "Snapshot saved");
    Ok(())
}
