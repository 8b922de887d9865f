// Read-only queries over a finished tree.
// These drive bulk operations: locate a folder by path, gather the file
// indices beneath it, send one priority change for all of them.

use super::arena::{FileTree, NodeId, TreeNode};
use crate::files::types::TorrentFile;

/// Number of '/'-separated segments minus one. Root-level paths have depth 0.
pub fn node_depth(path: &str) -> usize {
    path.matches('/').count()
}

/// Whether `path` equals `prefix` or lies beneath it on a segment boundary.
fn within(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Priority shared by the files under a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrioritySummary {
    /// Every file has this priority
    Uniform(i32),
    /// Files disagree
    Mixed,
    /// No files at all
    Empty,
}

impl<'a> FileTree<'a> {
    /// Collect file records depth-first.
    ///
    /// With a folder path, only files at that path or beneath it are returned
    /// ("movies" matches "movies/a.mkv" but not "movies2/a.mkv").
    /// An empty folder path names the root and returns every file.
    pub fn flatten(&self, folder_path: Option<&str>) -> Vec<&'a TorrentFile> {
        let folder_path = folder_path.filter(|p| !p.is_empty());
        let mut out = Vec::new();
        self.flatten_into(self.root, folder_path, &mut out);
        out
    }

    fn flatten_into(&self, id: NodeId, filter: Option<&str>, out: &mut Vec<&'a TorrentFile>) {
        for &child_id in self.children(id) {
            match self.get(child_id) {
                TreeNode::File(file) => {
                    if filter.map_or(true, |f| within(&file.path, f)) {
                        out.push(file.record);
                    }
                }
                TreeNode::Folder(folder) => {
                    // Skip subtrees that neither contain nor sit under the filter path.
                    let relevant = filter.map_or(true, |f| {
                        within(&folder.path, f) || within(f, &folder.path)
                    });
                    if relevant {
                        self.flatten_into(child_id, filter, out);
                    }
                }
            }
        }
    }

    /// File indices of every file under `id`, depth-first in display order.
    /// A file node yields its own index.
    pub fn file_indices(&self, id: NodeId) -> Vec<u32> {
        let mut out = Vec::new();
        self.collect_indices(id, &mut out);
        out
    }

    fn collect_indices(&self, id: NodeId, out: &mut Vec<u32>) {
        match self.get(id) {
            TreeNode::File(file) => out.push(file.file_index),
            TreeNode::Folder(folder) => {
                for &child_id in &folder.children {
                    self.collect_indices(child_id, out);
                }
            }
        }
    }

    /// Locate the node with exactly this path.
    ///
    /// Only folders whose path is a segment prefix of `path` are searched.
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        if path.is_empty() {
            return None;
        }
        let mut current = self.root;
        'descend: loop {
            for &child_id in self.children(current) {
                let child = self.get(child_id);
                if child.path() == path {
                    return Some(child_id);
                }
                if child.is_folder() && within(path, child.path()) {
                    current = child_id;
                    continue 'descend;
                }
            }
            return None;
        }
    }

    /// Number of file leaves in the whole tree.
    pub fn count_files(&self) -> usize {
        self.count_files_under(self.root)
    }

    /// Number of file leaves under `id` (1 for a file node).
    pub fn count_files_under(&self, id: NodeId) -> usize {
        match self.get(id) {
            TreeNode::File(_) => 1,
            TreeNode::Folder(folder) => folder
                .children
                .iter()
                .map(|&child_id| self.count_files_under(child_id))
                .sum(),
        }
    }

    /// Summarize the priority of the files under `id`.
    pub fn priority_summary(&self, id: NodeId) -> PrioritySummary {
        let mut summary = PrioritySummary::Empty;
        self.summarize_priority(id, &mut summary);
        summary
    }

    fn summarize_priority(&self, id: NodeId, summary: &mut PrioritySummary) {
        if *summary == PrioritySummary::Mixed {
            return;
        }
        match self.get(id) {
            TreeNode::File(file) => {
                *summary = match *summary {
                    PrioritySummary::Empty => PrioritySummary::Uniform(file.priority),
                    PrioritySummary::Uniform(p) if p == file.priority => *summary,
                    _ => PrioritySummary::Mixed,
                };
            }
            TreeNode::Folder(folder) => {
                for &child_id in &folder.children {
                    self.summarize_priority(child_id, summary);
                }
            }
        }
    }
}
