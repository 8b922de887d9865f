use std::fmt::Write;

use crate::tree::arena::{FileTree, NodeId, TreeNode};

/// Format bytes into human-readable size string.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    const TB: u64 = 1024 * GB;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a completion fraction as a percentage with one decimal.
pub fn format_progress(progress: f64) -> String {
    format!("{:.1}%", progress * 100.0)
}

/// Render the subtree under `id` as indented text, one node per line.
pub fn render_text(tree: &FileTree<'_>, id: NodeId) -> String {
    let mut out = String::new();
    for &child in tree.children(id) {
        render_node(tree, child, 0, &mut out);
    }
    out
}

fn render_node(tree: &FileTree<'_>, id: NodeId, indent: usize, out: &mut String) {
    let node = tree.get(id);
    let _ = match node {
        TreeNode::Folder(folder) => writeln!(
            out,
            "{:indent$}{}/  {}  {}",
            "",
            folder.name,
            format_size(folder.size),
            format_progress(folder.progress),
            indent = indent * 2
        ),
        TreeNode::File(file) => writeln!(
            out,
            "{:indent$}{}  {}  {}  [#{} p{}]",
            "",
            file.name,
            format_size(file.size),
            format_progress(file.progress),
            file.file_index,
            file.priority,
            indent = indent * 2
        ),
    };

    for &child in tree.children(id) {
        render_node(tree, child, indent + 1, out);
    }
}
