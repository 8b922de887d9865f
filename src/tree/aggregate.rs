use std::cmp::Ordering;

use compact_str::CompactString;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::arena::{FileTree, NodeId, TreeNode};

/// Compute size and weighted progress for all folder nodes (bottom-up).
/// After this, each folder's `size` is the sum of its children and its `progress`
/// is the size-weighted average of their progress (0 for an empty folder).
pub fn aggregate_stats(tree: &mut FileTree<'_>) {
    // Process nodes in reverse order (children before parents) since
    // children always have higher indices than their parents in our arena.
    // This is guaranteed by the add_child insertion order.
    let len = tree.nodes.len();
    for i in (0..len).rev() {
        let TreeNode::Folder(folder) = &tree.nodes[i] else {
            continue;
        };

        let mut total: u64 = 0;
        let mut weighted: f64 = 0.0;
        for &child_id in &folder.children {
            let child = &tree.nodes[child_id.index()];
            total += child.size();
            weighted += child.size() as f64 * child.progress();
        }

        let progress = if total > 0 {
            (weighted / total as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };

        if let TreeNode::Folder(folder) = &mut tree.nodes[i] {
            folder.size = total;
            folder.progress = progress;
        }
    }
}

/// Collation class of a character: separators and symbols sort before digits, digits before letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Space,
    Symbol,
    Digit,
    Letter,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_whitespace() {
            CharClass::Space
        } else if c.is_numeric() {
            CharClass::Digit
        } else if c.is_alphabetic() {
            CharClass::Letter
        } else {
            CharClass::Symbol
        }
    }
}

/// Collation key for a name: case-insensitive, accents as secondary differences,
/// raw bytes as the final tie-break.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct NameKey {
    primary: Vec<(CharClass, char)>,
    lower: String,
    raw: CompactString,
}

impl NameKey {
    fn new(name: &str) -> Self {
        Self {
            primary: fold_name(name),
            lower: name.to_lowercase(),
            raw: CompactString::new(name),
        }
    }
}

/// Primary collation weights: compatibility-decomposed, without accents, lowercased,
/// each character ranked by its class first.
fn fold_name(name: &str) -> Vec<(CharClass, char)> {
    name.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| (CharClass::of(c), c))
        .collect()
}

/// Sort key for one child: folders first, then by name.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    is_file: bool,
    name: NameKey,
}

impl SortKey {
    fn new(node: &TreeNode<'_>) -> Self {
        Self {
            is_file: !node.is_folder(),
            name: NameKey::new(node.name()),
        }
    }
}

/// Compare two names the way the file list presents them.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    NameKey::new(a).cmp(&NameKey::new(b))
}

/// Sort children of every folder: folders before files, then by name.
/// Reorders each child list in place without moving nodes in the arena.
pub fn sort_children(tree: &mut FileTree<'_>) {
    let len = tree.nodes.len();
    for i in 0..len {
        let children = match &mut tree.nodes[i] {
            TreeNode::Folder(folder) if folder.children.len() > 1 => {
                std::mem::take(&mut folder.children)
            }
            _ => continue,
        };

        let mut children: Vec<NodeId> = children;
        children.sort_by_cached_key(|id| SortKey::new(&tree.nodes[id.index()]));

        if let TreeNode::Folder(folder) = &mut tree.nodes[i] {
            folder.children = children;
        }
    }
}
