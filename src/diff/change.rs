//! Change-tree types produced by the differ

use crate::snapshot::FsData;
use serde::Serialize;
use std::fmt;

/// How an entry differs between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeMode {
    Same,
    New,
    Deleted,
    Changed,
}

impl ChangeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeMode::Same => "same",
            ChangeMode::New => "new",
            ChangeMode::Deleted => "deleted",
            ChangeMode::Changed => "changed",
        }
    }

    pub fn is_same(&self) -> bool {
        matches!(self, ChangeMode::Same)
    }

    /// New and deleted entries exist on one side only
    pub fn is_one_sided(&self) -> bool {
        matches!(self, ChangeMode::New | ChangeMode::Deleted)
    }
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Old and current state of one entry
///
/// Both sides are always present. A side that does not exist is a zero-size
/// placeholder with the other side's name and path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataChange {
    pub old: FsData,
    pub cur: FsData,
    pub change_mode: ChangeMode,
}

impl DataChange {
    /// Entry present on both sides; changed when the sizes differ
    pub fn between(old: FsData, cur: FsData) -> Self {
        let change_mode = if old.size == cur.size {
            ChangeMode::Same
        } else {
            ChangeMode::Changed
        };
        Self {
            old,
            cur,
            change_mode,
        }
    }

    /// Entry that only exists in the current snapshot
    pub fn added(cur: FsData) -> Self {
        Self {
            old: cur.placeholder(),
            cur,
            change_mode: ChangeMode::New,
        }
    }

    /// Entry that only exists in the old snapshot
    pub fn removed(old: FsData) -> Self {
        Self {
            cur: old.placeholder(),
            old,
            change_mode: ChangeMode::Deleted,
        }
    }

    pub fn name(&self) -> &str {
        &self.cur.name
    }

    pub fn path(&self) -> &str {
        &self.cur.path
    }

    /// Signed size difference, current minus old
    pub fn size_delta(&self) -> i64 {
        self.cur.size - self.old.size
    }

    /// Relative size change in percent
    ///
    /// New and deleted entries count as 100%. If either side is zero the
    /// result is 0 when both are zero and infinity otherwise.
    pub fn percent_size_change(&self) -> f64 {
        if self.change_mode.is_one_sided() {
            return 100.0;
        }

        let (old, cur) = (self.old.size, self.cur.size);
        if old.min(cur) == 0 {
            return if old.max(cur) == 0 { 0.0 } else { f64::INFINITY };
        }

        (1.0 - old as f64 / cur as f64).abs() * 100.0
    }

    pub fn grew(&self) -> bool {
        self.cur.size > self.old.size
    }

    pub fn shrank(&self) -> bool {
        self.cur.size < self.old.size
    }
}

/// Files carry only their data change
pub type FileChange = DataChange;

/// Change-tree node for a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderChange {
    pub data: DataChange,

    /// Current-side subfolders in snapshot order, then deleted ones by name
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subs: Vec<FolderChange>,

    /// Same ordering rule as `subs`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileChange>,
}

impl FolderChange {
    pub fn change_mode(&self) -> ChangeMode {
        self.data.change_mode
    }

    pub fn name(&self) -> &str {
        self.data.name()
    }

    /// Direct subfolder with the given name
    pub fn find_sub(&self, name: &str) -> Option<&FolderChange> {
        self.subs.iter().find(|sub| sub.name() == name)
    }

    /// Count every node of this change tree by mode
    pub fn summary(&self) -> ChangeSummary {
        let mut summary = ChangeSummary::default();
        let mut stack = vec![self];

        while let Some(folder) = stack.pop() {
            summary.folders.record(folder.change_mode());
            for file in &folder.files {
                summary.files.record(file.change_mode);
            }
            stack.extend(folder.subs.iter());
        }

        summary
    }
}

/// Counts per change mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeCounts {
    pub same: u64,
    pub new: u64,
    pub deleted: u64,
    pub changed: u64,
}

impl ModeCounts {
    pub fn record(&mut self, mode: ChangeMode) {
        match mode {
            ChangeMode::Same => self.same += 1,
            ChangeMode::New => self.new += 1,
            ChangeMode::Deleted => self.deleted += 1,
            ChangeMode::Changed => self.changed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.same + self.new + self.deleted + self.changed
    }
}

/// Change counts for a whole change tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub folders: ModeCounts,
    pub files: ModeCounts,
}

impl ChangeSummary {
    /// True when nothing differs
    pub fn is_unchanged(&self) -> bool {
        self.folders.same == self.folders.total() && self.files.same == self.files.total()
    }
}
