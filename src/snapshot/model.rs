//! Arena data model for scanned folder trees

use crate::listing::join_path;
use serde::Serialize;

/// Stable index of a folder inside its [`Snapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(usize);

impl FolderId {
    /// The root folder of every snapshot
    pub const ROOT: FolderId = FolderId(0);

    /// Position in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Name, path and size shared by folders and files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FsData {
    /// Final path segment
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Full path, unique within a snapshot
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Size in bytes (derived for folders, observed for files)
    #[serde(skip_serializing_if = "is_zero")]
    pub size: i64,

    /// Enclosing folder; `None` for the root and for synthesized placeholders
    #[serde(skip)]
    pub parent: Option<FolderId>,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

impl FsData {
    pub fn new(name: impl Into<String>, path: impl Into<String>, size: i64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
            parent: None,
        }
    }

    /// Zero-size copy carrying the same name and path
    pub fn placeholder(&self) -> Self {
        Self::new(self.name.clone(), self.path.clone(), 0)
    }
}

/// A file is plain entry data owned by its folder
pub type FileEntry = FsData;

/// A folder node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    /// Name, path, total size and parent
    pub data: FsData,

    /// Sum of direct child file sizes
    pub files_size: i64,

    /// Sum of direct child folder sizes (valid after aggregation)
    pub subfolders_size: i64,

    /// Child folders, in listing order
    pub subfolders: Vec<FolderId>,

    /// Child files, in listing order
    pub files: Vec<FileEntry>,
}

impl Folder {
    fn empty(data: FsData) -> Self {
        Self {
            data,
            files_size: 0,
            subfolders_size: 0,
            subfolders: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn path(&self) -> &str {
        &self.data.path
    }

    pub fn size(&self) -> i64 {
        self.data.size
    }
}

/// A scanned folder tree stored as an arena
///
/// Folders are only ever appended after their parent exists, so a child's id
/// is always greater than its parent's. The aggregation pass relies on this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    folders: Vec<Folder>,
}

impl Snapshot {
    /// Create a snapshot holding only an empty root folder
    pub fn new(root_name: impl Into<String>, root_path: impl Into<String>) -> Self {
        Self {
            folders: vec![Folder::empty(FsData::new(root_name, root_path, 0))],
        }
    }

    /// The root folder id
    pub fn root_id(&self) -> FolderId {
        FolderId::ROOT
    }

    /// The root folder
    pub fn root(&self) -> &Folder {
        &self.folders[0]
    }

    /// Look up a folder by id
    ///
    /// Ids are only handed out by this snapshot, so an unknown id is a bug.
    pub fn folder(&self, id: FolderId) -> &Folder {
        &self.folders[id.0]
    }

    pub(crate) fn folder_mut(&mut self, id: FolderId) -> &mut Folder {
        &mut self.folders[id.0]
    }

    /// Iterate the child folders of `id`
    pub fn subfolders(&self, id: FolderId) -> impl Iterator<Item = &Folder> + '_ {
        self.folder(id).subfolders.iter().map(move |&child| self.folder(child))
    }

    /// Append a child folder whose path is `parent.path` joined with `name`
    pub fn add_folder(&mut self, parent: FolderId, name: impl Into<String>) -> FolderId {
        let name = name.into();
        let path = join_path(self.folder(parent).path(), &name);
        self.add_folder_at(parent, name, path)
    }

    /// Append a child folder with an explicit path
    pub fn add_folder_at(
        &mut self,
        parent: FolderId,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> FolderId {
        let id = FolderId(self.folders.len());
        let mut data = FsData::new(name, path, 0);
        data.parent = Some(parent);
        self.folders.push(Folder::empty(data));
        self.folder_mut(parent).subfolders.push(id);
        id
    }

    /// Append a file whose path is `parent.path` joined with `name`
    pub fn add_file(&mut self, parent: FolderId, name: impl Into<String>, size: i64) {
        let name = name.into();
        let path = join_path(self.folder(parent).path(), &name);
        self.add_file_at(parent, name, path, size);
    }

    /// Append a file with an explicit path, adding its size to `files_size`
    pub fn add_file_at(
        &mut self,
        parent: FolderId,
        name: impl Into<String>,
        path: impl Into<String>,
        size: i64,
    ) {
        let mut data = FsData::new(name, path, size);
        data.parent = Some(parent);
        let folder = self.folder_mut(parent);
        folder.files_size += size;
        folder.files.push(data);
    }

    /// Find a folder by its full path
    pub fn find(&self, path: &str) -> Option<FolderId> {
        self.folders
            .iter()
            .position(|f| f.path() == path)
            .map(FolderId)
    }

    /// Aggregated size of the whole tree
    pub fn total_size(&self) -> i64 {
        self.root().size()
    }

    /// Number of folders, root included
    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Number of files in the whole tree
    pub fn file_count(&self) -> usize {
        self.folders.iter().map(|f| f.files.len()).sum()
    }

    /// Iterate `(id, folder)` pairs in arena order (parents before children)
    pub fn iter(&self) -> impl Iterator<Item = (FolderId, &Folder)> + '_ {
        self.folders
            .iter()
            .enumerate()
            .map(|(i, f)| (FolderId(i), f))
    }

    /// Iterate folders depth-first from the root, in child order
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            snapshot: self,
            stack: vec![(FolderId::ROOT, 0)],
        }
    }

    pub(crate) fn folders_mut(&mut self) -> &mut [Folder] {
        &mut self.folders
    }
}

/// Depth-first folder iterator yielding `(id, depth)`
pub struct DepthFirst<'a> {
    snapshot: &'a Snapshot,
    stack: Vec<(FolderId, usize)>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (FolderId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let children = &self.snapshot.folder(id).subfolders;
        self.stack
            .extend(children.iter().rev().map(|&child| (child, depth + 1)));
        Some((id, depth))
    }
}
