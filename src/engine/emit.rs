//! Artifact composition.
//!
//! Once every root has been traversed, the emitter assembles the final
//! single-header text: an optional include guard, the deduplicated
//! system-include block, and the accumulated body.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::line::GUARD_LINE;
use crate::engine::context::BundleContext;
use crate::engine::errors::BundleError;
use crate::engine::traversal::Inliner;

/// Default recursion guard for the include graph.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Ordering of the hoisted system-include block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncludeOrder {
    /// Lexicographic by literal line text.
    #[default]
    Sorted,
    /// Stable first-seen order.
    FirstSeen,
}

impl std::str::FromStr for IncludeOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sorted" => Ok(IncludeOrder::Sorted),
            "first-seen" => Ok(IncludeOrder::FirstSeen),
            _ => Err(format!(
                "invalid include order '{}'; expected 'sorted' or 'first-seen'",
                s
            )),
        }
    }
}

/// Identity used by the visited set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupeMode {
    /// Key by the literal include line. Matches the historical behavior
    /// exactly: two spellings of one target are treated as distinct and
    /// inlined twice.
    #[default]
    Literal,
    /// Key by the canonicalized target path, closing the
    /// differently-spelled-duplicate gap.
    Path,
}

impl std::str::FromStr for DedupeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "literal" => Ok(DedupeMode::Literal),
            "path" => Ok(DedupeMode::Path),
            _ => Err(format!(
                "invalid dedupe mode '{}'; expected 'literal' or 'path'",
                s
            )),
        }
    }
}

/// Options for a bundling run.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    /// Directory local includes resolve against.
    pub base_dir: PathBuf,

    /// Emit a `#pragma once` line at the top of the artifact.
    pub guard: bool,

    /// Ordering of the system-include block.
    pub order: IncludeOrder,

    /// Visited-set identity.
    pub dedupe: DedupeMode,

    /// Raise MalformedDirective for near-miss directives in the header
    /// scan instead of copying them through as content.
    pub strict: bool,

    /// Recursion guard.
    pub max_depth: usize,
}

impl BundleOptions {
    /// Create options with the given base directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        BundleOptions {
            base_dir: base_dir.into(),
            guard: true,
            order: IncludeOrder::Sorted,
            dedupe: DedupeMode::Literal,
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set whether to emit the include guard.
    pub fn with_guard(mut self, guard: bool) -> Self {
        self.guard = guard;
        self
    }

    /// Set the system-include ordering.
    pub fn with_order(mut self, order: IncludeOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the visited-set identity.
    pub fn with_dedupe(mut self, dedupe: DedupeMode) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// Set strict directive checking.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the recursion guard.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Bundle the given roots into a single-header artifact.
///
/// Roots are traversed in caller order with shared state, so a later
/// root never re-expands a header an earlier root already pulled in.
/// Returns the artifact text; persisting it is the caller's concern.
pub fn bundle(roots: &[PathBuf], opts: &BundleOptions) -> Result<String, BundleError> {
    let ctx = traverse(roots, opts)?;
    Ok(compose(&ctx, opts))
}

/// Run the traversal over all roots and return the accumulated state.
pub fn traverse(roots: &[PathBuf], opts: &BundleOptions) -> Result<BundleContext, BundleError> {
    let inliner = Inliner::new(opts);
    let mut ctx = BundleContext::new();

    for root in roots {
        inliner.inline_root(root, &mut ctx)?;
    }

    Ok(ctx)
}

/// Compose the artifact text from accumulated traversal state.
pub fn compose(ctx: &BundleContext, opts: &BundleOptions) -> String {
    let mut artifact = String::new();

    if opts.guard {
        artifact.push_str(GUARD_LINE);
        artifact.push_str("\n\n");
    }

    for line in dedup_includes(ctx.system_includes(), opts.order) {
        artifact.push_str(&line);
        artifact.push('\n');
    }
    artifact.push('\n');

    artifact.push_str(ctx.body());
    artifact
}

/// Deduplicate the collected system-include lines by exact text, in
/// emission order.
pub fn dedup_includes(lines: &[String], order: IncludeOrder) -> Vec<String> {
    match order {
        IncludeOrder::Sorted => {
            let mut unique: Vec<String> = lines.to_vec();
            unique.sort();
            unique.dedup();
            unique
        }
        IncludeOrder::FirstSeen => {
            let mut seen = HashSet::new();
            lines
                .iter()
                .filter(|l| seen.insert(l.as_str()))
                .cloned()
                .collect()
        }
    }
}
