//! Post-scan size aggregation

use crate::snapshot::model::Snapshot;

impl Snapshot {
    /// Compute every folder's `subfolders_size` and `size` from its children
    ///
    /// Children always sit after their parent in the arena, so sweeping the
    /// arena backwards visits every child before its parent: a post-order pass
    /// without recursion.
    pub fn aggregate(&mut self) {
        let folders = self.folders_mut();
        for i in (0..folders.len()).rev() {
            let subfolders_size: i64 = folders[i]
                .subfolders
                .iter()
                .map(|child| folders[child.index()].data.size)
                .sum();

            let folder = &mut folders[i];
            folder.subfolders_size = subfolders_size;
            folder.data.size = folder.files_size + subfolders_size;
        }
    }
}
