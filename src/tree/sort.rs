use std::cmp::Reverse;
use std::str::FromStr;

use serde::Serialize;

use super::{FolderNode, TreeNode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Case-insensitive by node name.
    #[default]
    Name,
    /// Largest aggregate size first.
    Size,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "size" => Ok(Self::Size),
            other => Err(format!("unknown sort key '{other}' (expected 'name' or 'size')")),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Size => "size",
        })
    }
}

/// Order every level of the tree by `key`. Both orders are stable.
pub fn sort(mut nodes: Vec<TreeNode>, key: SortKey) -> Vec<TreeNode> {
    match key {
        SortKey::Name => {
            nodes.sort_by_cached_key(|n| (n.name().to_lowercase(), n.name().to_string()));
        }
        SortKey::Size => nodes.sort_by_key(|n| Reverse(n.size())),
    }
    nodes
        .into_iter()
        .map(|node| match node {
            TreeNode::Folder(folder) => TreeNode::Folder(FolderNode {
                children: sort(folder.children, key),
                ..folder
            }),
            file @ TreeNode::File(_) => file,
        })
        .collect()
}
