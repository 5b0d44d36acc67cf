//! `coalesce tree` command

use std::collections::HashSet;

use anyhow::Result;
use petgraph::graph::NodeIndex;

use crate::cli::TreeArgs;
use coalesce::ops::{include_graph, IncludeGraph};

pub fn execute(args: TreeArgs) -> Result<()> {
    let settings = super::resolve_graph_settings(&args.roots, args.base_dir.as_deref())?;

    let graph = include_graph(&settings.roots, &settings.base_dir);

    let mut seen = HashSet::new();
    for &root in graph.roots() {
        print_tree(
            &graph,
            root,
            0,
            args.depth.unwrap_or(usize::MAX),
            &mut seen,
            args.duplicates,
        );
    }

    Ok(())
}

fn print_tree(
    graph: &IncludeGraph,
    node: NodeIndex,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<NodeIndex>,
    show_duplicates: bool,
) {
    if depth > max_depth {
        return;
    }

    let is_duplicate = seen.contains(&node);
    seen.insert(node);

    let prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}├── ", "│   ".repeat(depth - 1))
    };

    let marker = if !graph.is_resolved(node) {
        " (missing)"
    } else if is_duplicate && !show_duplicates {
        " (*)"
    } else {
        ""
    };

    println!("{}{}{}", prefix, graph.display_path(node).display(), marker);

    // Don't recurse into duplicates unless explicitly requested
    if is_duplicate && !show_duplicates {
        return;
    }

    for child in graph.children(node) {
        print_tree(graph, child, depth + 1, max_depth, seen, show_duplicates);
    }
}
