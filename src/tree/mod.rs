//! Folder tree view over a flat module list.
//!
//! [`build_tree`] groups modules by the directories in their paths and sums
//! sizes bottom-up. [`compress`] collapses chains of single-folder folders and
//! [`sort`] orders every level by name or size. Each step consumes a tree and
//! returns a new one; [`build_view`] runs all three.

mod compress;
mod sort;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::{Module, ModuleId, ModuleKind};

pub use compress::compress;
pub use sort::{SortKey, sort};

/// Id reported for folder nodes, which wrap no module.
pub const FOLDER_ID: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File(FileNode),
    Folder(FolderNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub module_id: ModuleId,
    /// Last path segment.
    pub name: String,
    /// Module path as the bundler reported it.
    pub path: String,
    pub size: u64,
    pub kind: ModuleKind,
    pub chunk_ids: Vec<String>,
    pub concatenated_module_ids: Vec<ModuleId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    /// Folder label; compressed chains read `a/b/c`.
    pub name: String,
    /// Forward-slash path from the tree root to this folder.
    pub path: String,
    /// Sum of the children's sizes.
    pub size: u64,
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    Normal,
    Concatenated,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            Self::File(f) => &f.name,
            Self::Folder(f) => &f.name,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            Self::File(f) => f.size,
            Self::Folder(f) => f.size,
        }
    }

    pub fn resource_path(&self) -> &str {
        match self {
            Self::File(f) => &f.path,
            Self::Folder(f) => &f.path,
        }
    }

    /// Module id, or [`FOLDER_ID`] for folders.
    pub fn id(&self) -> i64 {
        match self {
            Self::File(f) => i64::from(f.module_id.0),
            Self::Folder(_) => FOLDER_ID,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Folder(_) => NodeKind::Folder,
            Self::File(f) => match f.kind {
                ModuleKind::Normal => NodeKind::Normal,
                ModuleKind::Concatenated => NodeKind::Concatenated,
            },
        }
    }

    /// Chunks the module was emitted into. Empty for folders.
    pub fn chunk_ids(&self) -> &[String] {
        match self {
            Self::File(f) => &f.chunk_ids,
            Self::Folder(_) => &[],
        }
    }

    pub fn concatenated_module_ids(&self) -> &[ModuleId] {
        match self {
            Self::File(f) => &f.concatenated_module_ids,
            Self::Folder(_) => &[],
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            Self::File(_) => &[],
            Self::Folder(f) => &f.children,
        }
    }
}

/// A module with its path split into directory segments and a file name.
struct Entry<'a> {
    dirs: Vec<&'a str>,
    name: &'a str,
    module: &'a Module,
}

impl<'a> Entry<'a> {
    fn new(module: &'a Module) -> Self {
        let mut segments: Vec<&str> = module
            .path
            .split(['/', '\\'])
            .filter(|s| !s.is_empty())
            .collect();
        // A path without segments lands at the root under its raw text.
        let name = segments.pop().unwrap_or(module.path.as_str());
        Self {
            dirs: segments,
            name,
            module,
        }
    }

    fn into_node(self) -> TreeNode {
        TreeNode::File(FileNode {
            module_id: self.module.id,
            name: self.name.to_string(),
            path: self.module.path.clone(),
            size: self.module.source_size,
            kind: self.module.kind,
            chunk_ids: self.module.chunk_ids.clone(),
            concatenated_module_ids: self.module.concatenated_module_ids.clone(),
        })
    }
}

/// Group modules into a folder tree, files first, then folders by name.
///
/// Grouping depends only on path structure: backslashes count as
/// separators and empty segments are ignored.
pub fn build_tree<'a>(modules: impl IntoIterator<Item = &'a Module>) -> Vec<TreeNode> {
    let entries = modules.into_iter().map(Entry::new).collect();
    build_level(entries, 0, "")
}

fn build_level<'a>(entries: Vec<Entry<'a>>, depth: usize, base: &str) -> Vec<TreeNode> {
    let mut files = Vec::new();
    let mut folders: BTreeMap<&'a str, Vec<Entry<'a>>> = BTreeMap::new();
    for entry in entries {
        match entry.dirs.get(depth).copied() {
            None => files.push(entry.into_node()),
            Some(dir) => folders.entry(dir).or_default().push(entry),
        }
    }

    let mut nodes = files;
    for (name, members) in folders {
        let path = if base.is_empty() {
            name.to_string()
        } else {
            format!("{base}/{name}")
        };
        let children = build_level(members, depth + 1, &path);
        nodes.push(TreeNode::Folder(FolderNode {
            name: name.to_string(),
            size: children.iter().map(TreeNode::size).sum(),
            path,
            children,
        }));
    }
    nodes
}

/// Build, compress and sort in one go.
pub fn build_view<'a>(modules: impl IntoIterator<Item = &'a Module>, key: SortKey) -> Vec<TreeNode> {
    sort(compress(build_tree(modules)), key)
}
