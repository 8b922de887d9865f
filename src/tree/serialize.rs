// Nested JSON view of a tree, as consumed by file list renderers.

use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

use super::arena::{FileTree, NodeId, TreeNode};

/// A node together with the arena it lives in.
struct NodeView<'t, 'a> {
    tree: &'t FileTree<'a>,
    id: NodeId,
}

/// The children of a folder, serialized as an array of nested nodes.
struct ChildrenView<'t, 'a> {
    tree: &'t FileTree<'a>,
    id: NodeId,
}

impl Serialize for ChildrenView<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let children = self.tree.children(self.id);
        let mut seq = serializer.serialize_seq(Some(children.len()))?;
        for &id in children {
            seq.serialize_element(&NodeView {
                tree: self.tree,
                id,
            })?;
        }
        seq.end()
    }
}

impl Serialize for NodeView<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.tree.get(self.id) {
            TreeNode::Folder(folder) => {
                let mut s = serializer.serialize_struct("Folder", 6)?;
                s.serialize_field("type", "folder")?;
                s.serialize_field("name", folder.name.as_str())?;
                s.serialize_field("path", folder.path.as_str())?;
                s.serialize_field("size", &folder.size)?;
                s.serialize_field("progress", &folder.progress)?;
                s.serialize_field(
                    "children",
                    &ChildrenView {
                        tree: self.tree,
                        id: self.id,
                    },
                )?;
                s.end()
            }
            TreeNode::File(file) => {
                let mut s = serializer.serialize_struct("File", 7)?;
                s.serialize_field("type", "file")?;
                s.serialize_field("name", file.name.as_str())?;
                s.serialize_field("path", file.path.as_str())?;
                s.serialize_field("size", &file.size)?;
                s.serialize_field("progress", &file.progress)?;
                s.serialize_field("priority", &file.priority)?;
                s.serialize_field("index", &file.file_index)?;
                s.end()
            }
        }
    }
}

/// Serializes as the array of root-level nodes.
impl Serialize for FileTree<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ChildrenView {
            tree: self,
            id: self.root,
        }
        .serialize(serializer)
    }
}
