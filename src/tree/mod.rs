pub mod aggregate;
pub mod arena;
pub mod serialize;
pub mod traverse;

use std::collections::HashMap;
use std::convert::Infallible;

use compact_str::CompactString;

use self::arena::{FileNode, FileTree, FolderNode, NodeId, TreeNode};
use crate::error::TreeError;
use crate::files::types::TorrentFile;

pub use self::traverse::{node_depth, PrioritySummary};

/// What to do when two records share a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The later record replaces the earlier one in place; a warning is logged.
    #[default]
    LastWins,
    /// Fail the build with a [`TreeError`].
    Reject,
}

/// Tree construction settings.
#[derive(Debug, Clone, Default)]
pub struct TreeConfig {
    /// Handling of duplicate file paths and file/folder path clashes
    pub duplicates: DuplicatePolicy,
}

/// Split a relative path into its '/'-separated segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').collect()
}

/// Join a parent path and a child name. Root-level nodes carry just their name.
fn join_path(parent: &str, name: &str) -> CompactString {
    if parent.is_empty() {
        CompactString::new(name)
    } else {
        let mut path = CompactString::with_capacity(parent.len() + 1 + name.len());
        path.push_str(parent);
        path.push('/');
        path.push_str(name);
        path
    }
}

/// Build a sorted, aggregated FileTree from a flat list of torrent files.
///
/// Duplicate paths follow [`DuplicatePolicy::LastWins`], so this never fails.
pub fn build_file_tree(files: &[TorrentFile]) -> FileTree<'_> {
    let mut tree = FileTree::new();
    let inserted: Result<(), Infallible> = insert_with(&mut tree, files, |clash| {
        warn_clash(&clash);
        Ok(())
    });
    match inserted {
        Ok(()) => {}
        Err(never) => match never {},
    }
    finish(&mut tree);
    log_summary(files, &tree);
    tree
}

/// Build a sorted, aggregated FileTree using the given configuration.
pub fn build_file_tree_with<'a>(
    files: &'a [TorrentFile],
    config: &TreeConfig,
) -> Result<FileTree<'a>, TreeError> {
    let mut tree = FileTree::new();
    insert_files(&mut tree, files, config.duplicates)?;
    finish(&mut tree);
    log_summary(files, &tree);
    Ok(tree)
}

fn finish(tree: &mut FileTree<'_>) {
    aggregate::aggregate_stats(tree);
    aggregate::sort_children(tree);
}

fn log_summary(files: &[TorrentFile], tree: &FileTree<'_>) {
    tracing::info!(
        "Tree built from {} records: {} folders, {} files, {} bytes",
        files.len(),
        tree.folder_count(),
        tree.count_files(),
        tree.total_size()
    );
}

/// Two records competing for the same path.
#[derive(Debug)]
enum Clash<'p> {
    /// A second file with the path of an existing file
    Duplicate { path: &'p str, first: u32, second: u32 },
    /// A file with the path of an existing folder
    FileOverFolder(&'p str),
    /// A folder with the path of an existing file
    FolderOverFile(&'p str),
}

fn warn_clash(clash: &Clash<'_>) {
    match clash {
        Clash::Duplicate {
            path,
            first,
            second,
        } => tracing::warn!(
            "Duplicate file path '{}': record {} replaces record {}",
            path,
            second,
            first
        ),
        Clash::FileOverFolder(path) => {
            tracing::warn!("File '{}' has the same path as a folder; keeping both", path)
        }
        Clash::FolderOverFile(path) => {
            tracing::warn!("Folder '{}' has the same path as a file; keeping both", path)
        }
    }
}

fn reject_clash(clash: Clash<'_>) -> TreeError {
    match clash {
        Clash::Duplicate {
            path,
            first,
            second,
        } => TreeError::DuplicatePath {
            path: path.to_string(),
            first,
            second,
        },
        Clash::FileOverFolder(path) | Clash::FolderOverFile(path) => TreeError::PathConflict {
            path: path.to_string(),
        },
    }
}

/// Attach every record to `tree`, creating folders for shared path prefixes once.
///
/// Leaves the tree unsorted and unaggregated.
pub fn insert_files<'a>(
    tree: &mut FileTree<'a>,
    files: &'a [TorrentFile],
    policy: DuplicatePolicy,
) -> Result<(), TreeError> {
    insert_with(tree, files, |clash| match policy {
        DuplicatePolicy::LastWins => {
            warn_clash(&clash);
            Ok(())
        }
        DuplicatePolicy::Reject => Err(reject_clash(clash)),
    })
}

/// Insert records, asking `resolve` what to do whenever two of them compete for a path.
/// An `Ok` from `resolve` keeps building: duplicates replace the earlier file in place,
/// file/folder clashes keep both nodes.
fn insert_with<'a, E, F>(
    tree: &mut FileTree<'a>,
    files: &'a [TorrentFile],
    mut resolve: F,
) -> Result<(), E>
where
    F: FnMut(Clash<'_>) -> Result<(), E>,
{
    // Map from full folder path → NodeId for parent lookups
    let mut folders: HashMap<CompactString, NodeId> = HashMap::new();
    // Map from full file path → NodeId for duplicate detection
    let mut leaves: HashMap<CompactString, NodeId> = HashMap::new();

    for file in files {
        let segments = split_path(&file.name);
        let (leaf_name, ancestors) = match segments.split_last() {
            Some(split) => split,
            None => continue,
        };

        let parent_id = ensure_folders(tree, &mut folders, &leaves, ancestors, &mut resolve)?;
        let path = join_path(tree.get(parent_id).path(), leaf_name);

        if folders.contains_key(&path) {
            resolve(Clash::FileOverFolder(&path))?;
        }

        let mut node = FileNode {
            name: CompactString::new(leaf_name),
            path: path.clone(),
            size: file.size,
            progress: file.progress,
            priority: file.priority,
            file_index: file.index,
            parent: None,
            depth: 0, // will be set by add_child
            record: file,
        };

        if let Some(&existing) = leaves.get(&path) {
            let TreeNode::File(previous) = tree.get(existing) else {
                continue;
            };
            resolve(Clash::Duplicate {
                path: &path,
                first: previous.file_index,
                second: file.index,
            })?;
            node.parent = previous.parent;
            node.depth = previous.depth;
            *tree.get_mut(existing) = TreeNode::File(node);
            continue;
        }

        let id = tree.add_child(parent_id, TreeNode::File(node));
        leaves.insert(path, id);
    }

    tracing::debug!(
        "Inserted {} records into {} nodes ({} folders)",
        files.len(),
        tree.len() - 1,
        folders.len()
    );
    Ok(())
}

/// Ensure every folder along `segments` exists, creating missing ones from the top down.
/// Returns the deepest folder (or the root when `segments` is empty).
fn ensure_folders<E, F>(
    tree: &mut FileTree<'_>,
    folders: &mut HashMap<CompactString, NodeId>,
    leaves: &HashMap<CompactString, NodeId>,
    segments: &[&str],
    resolve: &mut F,
) -> Result<NodeId, E>
where
    F: FnMut(Clash<'_>) -> Result<(), E>,
{
    let mut parent_id = tree.root;

    for segment in segments {
        let path = join_path(tree.get(parent_id).path(), segment);

        // Fast path: already exists
        if let Some(&id) = folders.get(&path) {
            parent_id = id;
            continue;
        }

        if leaves.contains_key(&path) {
            resolve(Clash::FolderOverFile(&path))?;
        }

        let node = TreeNode::Folder(FolderNode {
            name: CompactString::new(segment),
            path: path.clone(),
            size: 0,
            progress: 0.0,
            parent: None,
            children: Vec::new(),
            depth: 0,
        });
        let id = tree.add_child(parent_id, node);
        folders.insert(path, id);
        parent_id = id;
    }

    Ok(parent_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn album() -> Vec<TorrentFile> {
        vec![
            TorrentFile::new(0, "album/track01.mp3", 1000, 0.5),
            TorrentFile::new(1, "album/track02.mp3", 2000, 1.0),
            TorrentFile::new(2, "cover.jpg", 500, 1.0),
        ]
    }

    fn names(tree: &FileTree<'_>, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| tree.get(id).name().to_string()).collect()
    }

    #[test]
    fn split_path_keeps_segment_order() {
        assert_eq!(split_path("a/b/c.txt"), vec!["a", "b", "c.txt"]);
        assert_eq!(split_path("root.txt"), vec!["root.txt"]);
    }

    #[test]
    fn album_scenario() {
        let files = album();
        let tree = build_file_tree(&files);

        assert_eq!(names(&tree, tree.roots()), vec!["album", "cover.jpg"]);

        let album = tree.get(tree.roots()[0]);
        assert!(album.is_folder());
        assert_eq!(album.path(), "album");
        assert_eq!(album.size(), 3000);
        assert!((album.progress() - 2500.0 / 3000.0).abs() < 1e-12);
        assert_eq!(
            names(&tree, tree.children(tree.roots()[0])),
            vec!["track01.mp3", "track02.mp3"]
        );

        let cover = tree.get(tree.roots()[1]).as_file().unwrap();
        assert_eq!(cover.size, 500);
        assert_eq!(cover.progress, 1.0);
        assert_eq!(cover.file_index, 2);
        assert!(std::ptr::eq(cover.record, &files[2]));

        assert_eq!(tree.total_size(), 3500);
    }

    #[test]
    fn empty_input_builds_empty_tree() {
        let tree = build_file_tree(&[]);
        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
        assert_eq!(tree.count_files(), 0);
        assert_eq!(tree.total_progress(), 0.0);
    }

    #[test]
    fn shared_prefixes_create_one_folder() {
        let files = vec![
            TorrentFile::new(0, "show/s01/e01.mkv", 10, 0.0),
            TorrentFile::new(1, "show/s01/e02.mkv", 10, 0.0),
            TorrentFile::new(2, "show/s02/e01.mkv", 10, 0.0),
            TorrentFile::new(3, "show/extras/s01/e01.mkv", 10, 0.0),
        ];
        let tree = build_file_tree(&files);

        assert_eq!(tree.folder_count(), 5);
        assert_eq!(tree.roots().len(), 1);
        let show = tree.roots()[0];
        assert_eq!(names(&tree, tree.children(show)), vec!["extras", "s01", "s02"]);

        let nested = tree.find_by_path("show/extras/s01/e01.mkv").unwrap();
        assert_eq!(tree.get(nested).depth(), 3);
    }

    #[test]
    fn duplicate_path_last_record_wins() {
        let files = vec![
            TorrentFile::new(0, "dir/a.bin", 100, 0.0),
            TorrentFile::new(1, "dir/b.bin", 100, 0.0),
            TorrentFile::new(2, "dir/a.bin", 300, 1.0),
        ];
        let tree = build_file_tree(&files);

        assert_eq!(tree.count_files(), 2);
        let a = tree.find_by_path("dir/a.bin").unwrap();
        let a = tree.get(a).as_file().unwrap();
        assert_eq!(a.file_index, 2);
        assert_eq!(a.size, 300);
        assert_eq!(a.depth, 1);
        assert_eq!(tree.total_size(), 400);
    }

    #[test]
    fn default_build_matches_default_config() {
        let files = vec![
            TorrentFile::new(0, "dir/a.bin", 100, 0.0),
            TorrentFile::new(1, "dir", 50, 1.0),
            TorrentFile::new(2, "dir/a.bin", 300, 1.0),
        ];
        let plain = build_file_tree(&files);
        let configured = build_file_tree_with(&files, &TreeConfig::default()).unwrap();

        assert_eq!(
            serde_json::to_value(&plain).unwrap(),
            serde_json::to_value(&configured).unwrap()
        );
        assert_eq!(plain.count_files(), 2);
        assert_eq!(plain.total_size(), 350);
    }

    #[test]
    fn duplicate_path_rejected_when_strict() {
        let files = vec![
            TorrentFile::new(4, "dir/a.bin", 100, 0.0),
            TorrentFile::new(7, "dir/a.bin", 300, 1.0),
        ];
        let config = TreeConfig {
            duplicates: DuplicatePolicy::Reject,
        };
        let err = build_file_tree_with(&files, &config).unwrap_err();
        assert_eq!(
            err,
            TreeError::DuplicatePath {
                path: "dir/a.bin".to_string(),
                first: 4,
                second: 7,
            }
        );
    }

    #[test]
    fn file_folder_clash_rejected_when_strict() {
        let config = TreeConfig {
            duplicates: DuplicatePolicy::Reject,
        };

        let file_first = vec![
            TorrentFile::new(0, "data", 1, 0.0),
            TorrentFile::new(1, "data/part.bin", 1, 0.0),
        ];
        assert!(matches!(
            build_file_tree_with(&file_first, &config),
            Err(TreeError::PathConflict { .. })
        ));

        let folder_first = vec![
            TorrentFile::new(0, "data/part.bin", 1, 0.0),
            TorrentFile::new(1, "data", 1, 0.0),
        ];
        assert!(matches!(
            build_file_tree_with(&folder_first, &config),
            Err(TreeError::PathConflict { .. })
        ));

        // permissive builds keep both nodes
        let tree = build_file_tree(&folder_first);
        assert_eq!(tree.count_files(), 2);
        assert_eq!(tree.roots().len(), 2);
    }

    #[test]
    fn strict_build_accepts_unique_paths() {
        let files = album();
        let config = TreeConfig {
            duplicates: DuplicatePolicy::Reject,
        };
        let tree = build_file_tree_with(&files, &config).unwrap();
        assert_eq!(tree.count_files(), 3);
    }

    #[test]
    fn insert_leaves_tree_unsorted_and_unaggregated() {
        let files = vec![
            TorrentFile::new(0, "z.txt", 5, 1.0),
            TorrentFile::new(1, "a/b.txt", 5, 1.0),
        ];
        let mut tree = FileTree::new();
        insert_files(&mut tree, &files, DuplicatePolicy::LastWins).unwrap();

        assert_eq!(names(&tree, tree.roots()), vec!["z.txt", "a"]);
        let a = tree.get(tree.roots()[1]);
        assert_eq!(a.size(), 0);
        assert_eq!(a.progress(), 0.0);
    }

    fn arb_files() -> impl Strategy<Value = Vec<TorrentFile>> {
        let segment = prop::sample::select(vec!["a", "B", "c", "Docs", "é", "img"]);
        let path = prop::collection::vec(segment, 1..4);
        prop::collection::vec((path, 0u64..10_000, 0.0f64..=1.0, -1i32..=1), 0..40).prop_map(
            |entries| {
                let mut seen = std::collections::HashSet::new();
                let mut files = Vec::new();
                for (segments, size, progress, priority) in entries {
                    // leaves get a distinct extension so they never clash with folders
                    let name = format!("{}.bin", segments.join("/"));
                    if seen.insert(name.clone()) {
                        let index = files.len() as u32;
                        files.push(TorrentFile::new(index, name, size, progress).with_priority(priority));
                    }
                }
                files
            },
        )
    }

    proptest! {
        #[test]
        fn counts_every_unique_record(files in arb_files()) {
            let tree = build_file_tree(&files);
            prop_assert_eq!(tree.count_files(), files.len());
        }

        #[test]
        fn folders_roll_up_children(files in arb_files()) {
            let tree = build_file_tree(&files);
            for node in &tree.nodes {
                if let TreeNode::Folder(folder) = node {
                    let sum: u64 = folder.children.iter().map(|&c| tree.get(c).size()).sum();
                    prop_assert_eq!(folder.size, sum);
                    prop_assert!((0.0..=1.0).contains(&folder.progress));
                }
            }
        }

        #[test]
        fn paths_extend_parent_paths(files in arb_files()) {
            let tree = build_file_tree(&files);
            for &root in tree.roots() {
                prop_assert_eq!(tree.get(root).path(), tree.get(root).name());
            }
            for (i, node) in tree.nodes.iter().enumerate().skip(1) {
                prop_assert_eq!(node_depth(node.path()), node.depth() as usize);
                let parent = node.parent().unwrap();
                if parent != tree.root {
                    let expected = format!("{}/{}", tree.get(parent).path(), node.name());
                    prop_assert_eq!(node.path(), expected.as_str());
                }
                prop_assert_eq!(tree.find_by_path(node.path()), Some(NodeId(i as u32)));
            }
        }

        #[test]
        fn flatten_returns_every_record(files in arb_files()) {
            let tree = build_file_tree(&files);
            let mut indices: Vec<u32> = tree.flatten(None).iter().map(|f| f.index).collect();
            indices.sort_unstable();
            let expected: Vec<u32> = (0..files.len() as u32).collect();
            prop_assert_eq!(indices, expected);
        }

        #[test]
        fn sorting_is_idempotent(files in arb_files()) {
            let mut tree = build_file_tree(&files);
            let before: Vec<Vec<NodeId>> = (0..tree.len())
                .map(|i| tree.children(NodeId(i as u32)).to_vec())
                .collect();
            aggregate::sort_children(&mut tree);
            let after: Vec<Vec<NodeId>> = (0..tree.len())
                .map(|i| tree.children(NodeId(i as u32)).to_vec())
                .collect();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn build_ignores_input_order(files in arb_files()) {
            let mut reversed = files.clone();
            reversed.reverse();
            let forward = build_file_tree(&files);
            let backward = build_file_tree(&reversed);
            let forward_order: Vec<u32> = forward.flatten(None).iter().map(|f| f.index).collect();
            let backward_order: Vec<u32> = backward.flatten(None).iter().map(|f| f.index).collect();
            prop_assert_eq!(forward_order, backward_order);
        }
    }
}
