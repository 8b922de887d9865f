// Public library interface for torrent-tree
// Builds the folder view of a torrent's flat file listing; the debug tool uses the same modules

pub mod error;
pub mod files;
pub mod report;
pub mod tree;

pub use error::{LoadError, TreeError};
pub use files::types::TorrentFile;
pub use tree::arena::{FileNode, FileTree, FolderNode, NodeId, TreeNode};
pub use tree::{
    build_file_tree, build_file_tree_with, node_depth, DuplicatePolicy, PrioritySummary,
    TreeConfig,
};
