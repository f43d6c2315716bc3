use super::{FolderNode, TreeNode};

/// Collapse every folder whose only child is another folder into a single
/// node labelled `parent/child`.
///
/// Children are compressed first, so a merged node's children can no longer
/// form such a chain and the result is a fixed point. Folder sizes are
/// recomputed from the compressed children.
pub fn compress(nodes: Vec<TreeNode>) -> Vec<TreeNode> {
    nodes.into_iter().map(compress_node).collect()
}

fn compress_node(node: TreeNode) -> TreeNode {
    let (name, path, children) = match node {
        TreeNode::Folder(FolderNode {
            name,
            path,
            children,
            ..
        }) => (name, path, children),
        file @ TreeNode::File(_) => return file,
    };
    let children = match <[TreeNode; 1]>::try_from(compress(children)) {
        Ok([TreeNode::Folder(child)]) => {
            return TreeNode::Folder(FolderNode {
                name: format!("{name}/{}", child.name),
                path: child.path,
                size: child.size,
                children: child.children,
            });
        }
        Ok([only]) => vec![only],
        Err(children) => children,
    };
    TreeNode::Folder(FolderNode {
        name,
        path,
        size: children.iter().map(TreeNode::size).sum(),
        children,
    })
}
