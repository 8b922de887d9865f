use compact_str::CompactString;

use crate::files::types::TorrentFile;

/// Index into the arena `Vec<TreeNode>`. Uses u32 to save memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The synthetic root folder always lives in slot 0.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A folder. Size and progress are derived from the children by the aggregator.
#[derive(Debug, Clone)]
pub struct FolderNode {
    /// Folder name (last path segment)
    pub name: CompactString,
    /// Full relative path, '/'-separated
    pub path: CompactString,
    /// Sum of children sizes (0 until aggregated)
    pub size: u64,
    /// Size-weighted average of children progress (0 until aggregated)
    pub progress: f64,
    /// Parent folder (None for the synthetic root)
    pub parent: Option<NodeId>,
    /// Children in display order once sorted
    pub children: Vec<NodeId>,
    /// Depth in the tree (root-level nodes = 0)
    pub depth: u16,
}

/// A file leaf. Values are copied from the record and never recomputed.
#[derive(Debug, Clone)]
pub struct FileNode<'a> {
    pub name: CompactString,
    pub path: CompactString,
    pub size: u64,
    pub progress: f64,
    pub priority: i32,
    /// The record's `index`, used for bulk priority changes
    pub file_index: u32,
    pub parent: Option<NodeId>,
    pub depth: u16,
    /// The record this leaf was built from
    pub record: &'a TorrentFile,
}

#[derive(Debug, Clone)]
pub enum TreeNode<'a> {
    Folder(FolderNode),
    File(FileNode<'a>),
}

impl<'a> TreeNode<'a> {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder(f) => &f.name,
            TreeNode::File(f) => &f.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TreeNode::Folder(f) => &f.path,
            TreeNode::File(f) => &f.path,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            TreeNode::Folder(f) => f.size,
            TreeNode::File(f) => f.size,
        }
    }

    pub fn progress(&self) -> f64 {
        match self {
            TreeNode::Folder(f) => f.progress,
            TreeNode::File(f) => f.progress,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            TreeNode::Folder(f) => f.parent,
            TreeNode::File(f) => f.parent,
        }
    }

    pub fn depth(&self) -> u16 {
        match self {
            TreeNode::Folder(f) => f.depth,
            TreeNode::File(f) => f.depth,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder(_))
    }

    pub fn as_folder(&self) -> Option<&FolderNode> {
        match self {
            TreeNode::Folder(f) => Some(f),
            TreeNode::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode<'a>> {
        match self {
            TreeNode::File(f) => Some(f),
            TreeNode::Folder(_) => None,
        }
    }

    fn set_parent(&mut self, parent: NodeId, depth: u16) {
        match self {
            TreeNode::Folder(f) => {
                f.parent = Some(parent);
                f.depth = depth;
            }
            TreeNode::File(f) => {
                f.parent = Some(parent);
                f.depth = depth;
            }
        }
    }
}

/// The file tree stored as a flat arena of nodes, borrowing the records it was built from.
#[derive(Debug, Clone)]
pub struct FileTree<'a> {
    /// All nodes in contiguous memory; slot 0 is the synthetic root
    pub nodes: Vec<TreeNode<'a>>,
    /// Root node index
    pub root: NodeId,
}

impl<'a> FileTree<'a> {
    /// Create an empty tree holding only the synthetic root.
    pub fn new() -> Self {
        let root_node = FolderNode {
            name: CompactString::default(),
            path: CompactString::default(),
            size: 0,
            progress: 0.0,
            parent: None,
            children: Vec::new(),
            depth: 0,
        };

        FileTree {
            nodes: vec![TreeNode::Folder(root_node)],
            root: NodeId::ROOT,
        }
    }

    /// Append a node to the children of `parent`. Returns the new node's ID.
    ///
    /// Panics if `parent` is a file; the builder only ever attaches to folders.
    pub fn add_child(&mut self, parent: NodeId, mut node: TreeNode<'a>) -> NodeId {
        let new_id = NodeId(self.nodes.len() as u32);
        // Root-level nodes sit at depth 0 under the synthetic root.
        let depth = if parent == self.root {
            0
        } else {
            self.nodes[parent.index()].depth() + 1
        };
        node.set_parent(parent, depth);

        match &mut self.nodes[parent.index()] {
            TreeNode::Folder(folder) => folder.children.push(new_id),
            TreeNode::File(file) => panic!("cannot attach a child to file '{}'", file.path),
        }

        self.nodes.push(node);
        new_id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> &TreeNode<'a> {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeNode<'a> {
        &mut self.nodes[id.index()]
    }

    /// Total number of nodes, including the synthetic root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds nothing but the synthetic root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Child IDs of a node (empty for files).
    pub fn children(&self, parent: NodeId) -> &[NodeId] {
        match &self.nodes[parent.index()] {
            TreeNode::Folder(folder) => &folder.children,
            TreeNode::File(_) => &[],
        }
    }

    /// Root-level nodes, in display order once sorted.
    pub fn roots(&self) -> &[NodeId] {
        self.children(self.root)
    }

    /// Size of the whole torrent (valid after aggregation).
    pub fn total_size(&self) -> u64 {
        self.get(self.root).size()
    }

    /// Size-weighted completion of the whole torrent (valid after aggregation).
    pub fn total_progress(&self) -> f64 {
        self.get(self.root).progress()
    }

    /// Number of folder nodes, excluding the synthetic root.
    pub fn folder_count(&self) -> usize {
        self.nodes.iter().skip(1).filter(|n| n.is_folder()).count()
    }
}

impl Default for FileTree<'_> {
    fn default() -> Self {
        Self::new()
    }
}
