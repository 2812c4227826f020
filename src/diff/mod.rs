//! Snapshot differ and change-tree model

pub mod change;
mod differ;

pub use change::{ChangeMode, ChangeSummary, DataChange, FileChange, FolderChange, ModeCounts};
pub use differ::{diff, propagate_changes};
