//! Snapshot comparison
//!
//! Children are matched by name, files and subfolders separately. A folder
//! missing on one side is classified `new` or `deleted` outright and its whole
//! subtree inherits that mode. Matched folders start as `same` and are raised
//! to `changed` by [`propagate_changes`] when any direct child differs.

use crate::diff::change::{ChangeMode, DataChange, FileChange, FolderChange};
use crate::error::DiffError;
use crate::snapshot::{Folder, FolderId, FsData, Snapshot};
use std::collections::HashMap;
use tracing::debug;

/// A folder inside a particular snapshot
#[derive(Clone, Copy)]
struct Node<'a> {
    snapshot: &'a Snapshot,
    id: FolderId,
}

impl<'a> Node<'a> {
    fn folder(&self) -> &'a Folder {
        self.snapshot.folder(self.id)
    }

    fn subfolders(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let snapshot = self.snapshot;
        self.folder()
            .subfolders
            .iter()
            .map(move |&id| Node { snapshot, id })
    }
}

/// Which sides of a folder exist
enum Sides<'a> {
    Both(Node<'a>, Node<'a>),
    OldOnly(Node<'a>),
    CurOnly(Node<'a>),
}

/// Compare two aggregated snapshots of the same root
///
/// Fails when the roots differ in name or path; no change tree is produced
/// in that case.
pub fn diff(old: &Snapshot, cur: &Snapshot) -> Result<FolderChange, DiffError> {
    let (old_root, cur_root) = (old.root(), cur.root());
    if old_root.name() != cur_root.name() || old_root.path() != cur_root.path() {
        return Err(DiffError::StructuralMismatch {
            old_name: old_root.name().to_string(),
            old_path: old_root.path().to_string(),
            cur_name: cur_root.name().to_string(),
            cur_path: cur_root.path().to_string(),
        });
    }

    let mut root = diff_folder(Sides::Both(
        Node {
            snapshot: old,
            id: old.root_id(),
        },
        Node {
            snapshot: cur,
            id: cur.root_id(),
        },
    ));
    propagate_changes(&mut root);

    debug!(
        root = %root.data.cur.path,
        mode = %root.change_mode(),
        "Snapshots compared"
    );
    Ok(root)
}

/// Raise matched folders to `changed` when any direct child differs
///
/// Post-order, so a folder sees its subfolders' final modes. Folders that
/// are `new` or `deleted` keep their mode.
pub fn propagate_changes(folder: &mut FolderChange) {
    if folder.change_mode().is_one_sided() {
        return;
    }

    let mut differs = false;
    for sub in &mut folder.subs {
        propagate_changes(sub);
        differs |= !sub.change_mode().is_same();
    }
    differs |= folder.files.iter().any(|file| !file.change_mode.is_same());

    if differs {
        folder.data.change_mode = ChangeMode::Changed;
    }
}

fn diff_folder(sides: Sides<'_>) -> FolderChange {
    match sides {
        Sides::Both(old, cur) => FolderChange {
            data: DataChange {
                old: old.folder().data.clone(),
                cur: cur.folder().data.clone(),
                change_mode: ChangeMode::Same,
            },
            subs: match_subfolders(old, cur),
            files: match_files(&old.folder().files, &cur.folder().files),
        },
        Sides::OldOnly(old) => FolderChange {
            data: DataChange::removed(old.folder().data.clone()),
            subs: old
                .subfolders()
                .map(|sub| diff_folder(Sides::OldOnly(sub)))
                .collect(),
            files: old
                .folder()
                .files
                .iter()
                .map(|file| DataChange::removed(file.clone()))
                .collect(),
        },
        Sides::CurOnly(cur) => FolderChange {
            data: DataChange::added(cur.folder().data.clone()),
            subs: cur
                .subfolders()
                .map(|sub| diff_folder(Sides::CurOnly(sub)))
                .collect(),
            files: cur
                .folder()
                .files
                .iter()
                .map(|file| DataChange::added(file.clone()))
                .collect(),
        },
    }
}

fn match_subfolders(old: Node<'_>, cur: Node<'_>) -> Vec<FolderChange> {
    let mut unmatched: HashMap<&str, Node<'_>> = old
        .subfolders()
        .map(|node| (node.folder().name(), node))
        .collect();

    let mut subs = Vec::with_capacity(unmatched.len().max(cur.folder().subfolders.len()));
    for cur_sub in cur.subfolders() {
        let sides = match unmatched.remove(cur_sub.folder().name()) {
            Some(old_sub) => Sides::Both(old_sub, cur_sub),
            None => Sides::CurOnly(cur_sub),
        };
        subs.push(diff_folder(sides));
    }

    let mut deleted: Vec<_> = unmatched.into_iter().collect();
    deleted.sort_unstable_by(|a, b| a.0.cmp(b.0));
    subs.extend(
        deleted
            .into_iter()
            .map(|(_, old_sub)| diff_folder(Sides::OldOnly(old_sub))),
    );

    subs
}

fn match_files(old: &[FsData], cur: &[FsData]) -> Vec<FileChange> {
    let mut unmatched: HashMap<&str, &FsData> =
        old.iter().map(|file| (file.name.as_str(), file)).collect();

    let mut files = Vec::with_capacity(old.len().max(cur.len()));
    for cur_file in cur {
        let change = match unmatched.remove(cur_file.name.as_str()) {
            Some(old_file) => DataChange::between(old_file.clone(), cur_file.clone()),
            None => DataChange::added(cur_file.clone()),
        };
        files.push(change);
    }

    let mut deleted: Vec<_> = unmatched.into_values().collect();
    deleted.sort_unstable_by(|a, b| a.name.cmp(&b.name));
    files.extend(deleted.into_iter().map(|file| DataChange::removed(file.clone())));

    files
}
