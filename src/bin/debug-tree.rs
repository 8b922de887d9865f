/// Diagnostic tool: load a torrent file listing and print the folder tree
/// Usage: debug-tree <records.json> [--json] [--strict] [--folder <path>]
use anyhow::{bail, Context};
use std::path::PathBuf;
use torrent_tree::report::{format_progress, format_size, render_text};
use torrent_tree::{files, tree, DuplicatePolicy, TreeConfig};

struct Args {
    input: PathBuf,
    json: bool,
    strict: bool,
    folder: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut input = None;
    let mut json = false;
    let mut strict = false;
    let mut folder = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--strict" => strict = true,
            "--folder" => {
                folder = Some(args.next().context("--folder needs a path")?);
            }
            other if other.starts_with("--") => bail!("unknown flag {other}"),
            other => input = Some(PathBuf::from(other)),
        }
    }

    let input = input.context("usage: debug-tree <records.json> [--json] [--strict] [--folder <path>]")?;
    Ok(Args {
        input,
        json,
        strict,
        folder,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("torrent_tree=info".parse()?),
        )
        .init();

    let args = parse_args()?;

    let records = files::load_records(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;

    let config = TreeConfig {
        duplicates: if args.strict {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::LastWins
        },
    };
    let start = std::time::Instant::now();
    let tree = tree::build_file_tree_with(&records, &config)?;
    let elapsed = start.elapsed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    println!("=== {} ===", args.input.display());
    println!(
        "Records: {}  Folders: {}  Files: {}  Built in {:.2}ms",
        records.len(),
        tree.folder_count(),
        tree.count_files(),
        elapsed.as_secs_f64() * 1000.0
    );
    println!(
        "Total: {}  Progress: {}",
        format_size(tree.total_size()),
        format_progress(tree.total_progress())
    );
    println!();

    match &args.folder {
        None => print!("{}", render_text(&tree, tree.root)),
        Some(path) => {
            let id = tree
                .find_by_path(path)
                .with_context(|| format!("no node at '{path}'"))?;
            let node = tree.get(id);
            println!(
                "{} ({}, {}, depth {})",
                node.path(),
                format_size(node.size()),
                format_progress(node.progress()),
                torrent_tree::node_depth(node.path())
            );
            println!("Priority: {:?}", tree.priority_summary(id));
            println!("File indices: {:?}", tree.file_indices(id));
            for file in tree.flatten(Some(path)) {
                println!("  #{} {}", file.index, file.name);
            }
        }
    }

    Ok(())
}
