//! Static analysis of the local-include graph.
//!
//! Unlike the bundling traversal, the analysis here is tolerant: missing
//! targets and cycles are recorded and reported instead of aborting, so
//! `coalesce check` can list every problem in one pass.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use walkdir::WalkDir;

use crate::core::line::{classify, LineKind};
use crate::util::fs::{normalize_path, relative_path};

/// Header file extensions considered by the unreachable-file scan.
const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx"];

/// Result of scanning one header's directive block.
#[derive(Debug, Clone, Default)]
pub struct FileScan {
    /// Local include tokens from the header scan, in order.
    pub local: Vec<String>,

    /// System include lines from the header scan.
    pub system: Vec<String>,

    /// Include directives found below the first content line. These are
    /// never expanded or hoisted by the engine.
    pub trapped: Vec<String>,
}

/// The local-include graph reachable from a set of roots.
pub struct IncludeGraph {
    graph: DiGraph<PathBuf, ()>,
    indices: HashMap<PathBuf, NodeIndex>,
    scans: HashMap<NodeIndex, FileScan>,
    roots: Vec<NodeIndex>,
    base_dir: PathBuf,
    missing: Vec<MissingIssue>,
}

/// An include whose target could not be read.
#[derive(Debug, Clone, Serialize)]
pub struct MissingIssue {
    /// The include token (or root path) that failed to resolve.
    pub include: String,

    /// The referencing header, if any; roots have none.
    pub referrer: Option<PathBuf>,
}

/// A directive stranded below the first content line.
#[derive(Debug, Clone, Serialize)]
pub struct TrappedIssue {
    pub file: PathBuf,
    pub line: String,
}

/// Report produced by `coalesce check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Number of headers reached and scanned.
    pub files_scanned: usize,

    /// Distinct system includes seen across the graph.
    pub system_includes: usize,

    /// Includes whose targets cannot be read. Errors.
    pub missing: Vec<MissingIssue>,

    /// Include cycles, each listed as the member headers. Errors.
    pub cycles: Vec<Vec<PathBuf>>,

    /// Directives the engine would copy verbatim instead of processing.
    /// Warnings.
    pub trapped: Vec<TrappedIssue>,

    /// Headers under the base directory not reachable from any root.
    /// Warnings.
    pub unreachable: Vec<PathBuf>,
}

impl CheckReport {
    /// Whether the graph would bundle without errors.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.cycles.is_empty()
    }

    /// Whether there is anything at all to report.
    pub fn is_silent(&self) -> bool {
        self.is_clean() && self.trapped.is_empty() && self.unreachable.is_empty()
    }
}

impl IncludeGraph {
    /// The node for a base-dir-relative header path, if reached.
    pub fn node(&self, path: &Path) -> Option<NodeIndex> {
        self.indices.get(&normalize_path(&self.base_dir.join(path))).copied()
    }

    /// Root nodes in caller order.
    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Display path for a node, relative to the base directory.
    pub fn display_path(&self, idx: NodeIndex) -> PathBuf {
        relative_path(&normalize_path(&self.base_dir), &self.graph[idx])
    }

    /// Children of a node in include order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        // DiGraph iterates neighbors in reverse insertion order.
        let mut children: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        children.reverse();
        children
    }

    /// Whether the node's file could be read and scanned.
    pub fn is_resolved(&self, idx: NodeIndex) -> bool {
        self.scans.contains_key(&idx)
    }

    /// Number of scanned headers.
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }
}

/// Build the include graph reachable from `roots`.
///
/// Cycles and missing files are recorded, not fatal.
pub fn include_graph(roots: &[PathBuf], base_dir: &Path) -> IncludeGraph {
    let mut graph = DiGraph::new();
    let mut indices: HashMap<PathBuf, NodeIndex> = HashMap::new();
    let mut scans: HashMap<NodeIndex, FileScan> = HashMap::new();
    let mut missing: Vec<MissingIssue> = Vec::new();
    let mut root_nodes = Vec::new();

    fn intern(
        graph: &mut DiGraph<PathBuf, ()>,
        indices: &mut HashMap<PathBuf, NodeIndex>,
        path: PathBuf,
    ) -> NodeIndex {
        let key = normalize_path(&path);
        *indices
            .entry(key.clone())
            .or_insert_with(|| graph.add_node(key))
    }

    // Worklist of nodes whose files still need scanning.
    let mut pending: Vec<(NodeIndex, Option<PathBuf>, String)> = Vec::new();

    for root in roots {
        let target = base_dir.join(root);
        let idx = intern(&mut graph, &mut indices, target);
        root_nodes.push(idx);
        pending.push((idx, None, root.display().to_string()));
    }

    while let Some((idx, referrer, spelling)) = pending.pop() {
        if scans.contains_key(&idx) {
            continue;
        }

        let path = graph[idx].clone();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => {
                missing.push(MissingIssue {
                    include: spelling,
                    referrer,
                });
                continue;
            }
        };

        let scan = scan_text(&text);

        for token in &scan.local {
            let child = intern(&mut graph, &mut indices, base_dir.join(token));
            graph.add_edge(idx, child, ());
            if !scans.contains_key(&child) {
                pending.push((child, Some(path.clone()), token.clone()));
            }
        }

        scans.insert(idx, scan);
    }

    IncludeGraph {
        graph,
        indices,
        scans,
        roots: root_nodes,
        base_dir: base_dir.to_path_buf(),
        missing,
    }
}

/// Scan one file's text with the engine's two-phase discipline, without
/// recursing.
fn scan_text(text: &str) -> FileScan {
    let mut scan = FileScan::default();
    let mut in_header = true;

    for raw in text.split_inclusive('\n') {
        let line = raw.strip_suffix('\n').unwrap_or(raw);

        if in_header {
            match classify(line) {
                LineKind::Guard | LineKind::Blank => {}
                LineKind::LocalInclude { token } => scan.local.push(token.to_string()),
                LineKind::SystemInclude => scan.system.push(line.to_string()),
                LineKind::Content => in_header = false,
            }
        } else if !matches!(
            classify(line),
            LineKind::Content | LineKind::Blank | LineKind::Guard
        ) {
            scan.trapped.push(line.to_string());
        }
    }

    scan
}

/// Run every static check over the graph reachable from `roots`.
pub fn check(roots: &[PathBuf], base_dir: &Path) -> Result<CheckReport> {
    let g = include_graph(roots, base_dir);

    // Strongly connected components of size > 1 are cycles; so is a
    // header that includes itself.
    let mut cycles = Vec::new();
    for scc in tarjan_scc(&g.graph) {
        let is_cycle = scc.len() > 1
            || (scc.len() == 1 && g.graph.find_edge(scc[0], scc[0]).is_some());
        if is_cycle {
            let mut members: Vec<PathBuf> =
                scc.iter().map(|&idx| g.display_path(idx)).collect();
            members.sort();
            cycles.push(members);
        }
    }
    cycles.sort();

    let mut trapped = Vec::new();
    for (&idx, scan) in &g.scans {
        for line in &scan.trapped {
            trapped.push(TrappedIssue {
                file: g.display_path(idx),
                line: line.clone(),
            });
        }
    }
    trapped.sort_by(|a, b| (&a.file, &a.line).cmp(&(&b.file, &b.line)));

    let unreachable = unreachable_headers(&g, base_dir)?;

    let system_includes = g
        .scans
        .values()
        .flat_map(|scan| scan.system.iter())
        .collect::<HashSet<_>>()
        .len();

    Ok(CheckReport {
        files_scanned: g.len(),
        system_includes,
        missing: g.missing.clone(),
        cycles,
        trapped,
        unreachable,
    })
}

/// Headers under `base_dir` that no root reaches.
fn unreachable_headers(g: &IncludeGraph, base_dir: &Path) -> Result<Vec<PathBuf>> {
    let reached: HashSet<&PathBuf> = g.indices.keys().collect();
    let mut orphans = Vec::new();

    for entry in WalkDir::new(base_dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if !HEADER_EXTENSIONS.contains(&ext) {
            continue;
        }

        let normalized = normalize_path(entry.path());
        if !reached.contains(&normalized) {
            orphans.push(relative_path(&normalize_path(base_dir), &normalized));
        }
    }

    orphans.sort();
    Ok(orphans)
}
