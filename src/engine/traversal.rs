//! Recursive inliner for local includes.
//!
//! Each file is scanned in two phases. Phase A walks the header block:
//! guard and blank lines are dropped, local includes are expanded in
//! place (once per visit key, marked *before* recursing), and system
//! includes are collected for hoisting. The first content line ends
//! Phase A; from there Phase B copies every remaining line verbatim,
//! directives included. Callers must therefore keep all includes above
//! the first real content line of each header.

use std::path::Path;

use crate::core::line::{classify, is_directive_like, LineKind, LOCAL_PREFIX};
use crate::engine::context::BundleContext;
use crate::engine::emit::{BundleOptions, DedupeMode};
use crate::engine::errors::BundleError;
use crate::util::fs::normalize_path;

/// Depth-first inliner over the local-include graph.
pub struct Inliner<'a> {
    opts: &'a BundleOptions,
}

impl<'a> Inliner<'a> {
    pub fn new(opts: &'a BundleOptions) -> Self {
        Inliner { opts }
    }

    /// Expand one root header into the shared context.
    ///
    /// The root is marked visited under the include spelling that would
    /// reference it, so a later literal include of the same path is
    /// skipped rather than inlined twice.
    pub fn inline_root(&self, root: &Path, ctx: &mut BundleContext) -> Result<(), BundleError> {
        let target = self.opts.base_dir.join(root);
        let key = self.visit_key(root, &target);

        if !ctx.mark_visited(&key) {
            tracing::debug!("root {} already inlined, skipping", root.display());
            return Ok(());
        }

        let text = std::fs::read_to_string(&target).map_err(|source| {
            BundleError::MissingRoot {
                file: target.clone(),
                source,
            }
        })?;

        self.expand(&target, &text, ctx)
    }

    /// Expand a local include referenced from `referrer`.
    fn inline_child(
        &self,
        token: &str,
        referrer: &Path,
        ctx: &mut BundleContext,
    ) -> Result<(), BundleError> {
        let target = self.opts.base_dir.join(token);
        let canonical = normalize_path(&target);

        if ctx.is_in_progress(&canonical) {
            return Err(BundleError::CyclicInclude {
                chain: ctx.cycle_chain(&canonical),
            });
        }

        if ctx.depth() >= self.opts.max_depth {
            return Err(BundleError::DepthExceeded {
                file: target,
                limit: self.opts.max_depth,
            });
        }

        let text = std::fs::read_to_string(&target).map_err(|source| {
            BundleError::MissingInclude {
                include: token.to_string(),
                referrer: referrer.to_path_buf(),
                source,
            }
        })?;

        tracing::debug!("inlining {} (from {})", token, referrer.display());
        self.expand(&target, &text, ctx)
    }

    /// The two-phase scan over one file's lines.
    fn expand(
        &self,
        path: &Path,
        text: &str,
        ctx: &mut BundleContext,
    ) -> Result<(), BundleError> {
        ctx.push_in_progress(normalize_path(path));
        ctx.files.push(path.to_path_buf());

        let mut segments = text.split_inclusive('\n');

        // Phase A: header scan.
        for raw in segments.by_ref() {
            let line = raw.strip_suffix('\n').unwrap_or(raw);

            match classify(line) {
                LineKind::Guard | LineKind::Blank => {}

                LineKind::LocalInclude { token } => {
                    let target = self.opts.base_dir.join(token);
                    let key = match self.opts.dedupe {
                        DedupeMode::Literal => line.to_string(),
                        DedupeMode::Path => normalize_path(&target).display().to_string(),
                    };

                    if ctx.mark_visited(&key) {
                        self.inline_child(token, path, ctx)?;
                    } else {
                        tracing::trace!("already visited: {}", line);
                    }
                }

                LineKind::SystemInclude => {
                    ctx.system_includes.push(line.to_string());
                }

                LineKind::Content => {
                    if self.opts.strict && is_directive_like(line) {
                        return Err(BundleError::MalformedDirective {
                            file: path.to_path_buf(),
                            line: line.to_string(),
                        });
                    }

                    // First content line: emit it and end the header scan.
                    ctx.body.push_str(raw);
                    break;
                }
            }
        }

        // Phase B: verbatim copy of everything that remains, even lines
        // that look like includes.
        for raw in segments {
            ctx.body.push_str(raw);
        }

        // Separator after each file's contribution.
        ctx.body.push('\n');

        ctx.pop_in_progress();
        Ok(())
    }

    /// Visit key for a root, matching the spelling of a would-be include.
    fn visit_key(&self, root: &Path, target: &Path) -> String {
        match self.opts.dedupe {
            DedupeMode::Literal => format!("{}{}\"", LOCAL_PREFIX, root.display()),
            DedupeMode::Path => normalize_path(target).display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::emit::IncludeOrder;
    use std::fs;
    use tempfile::TempDir;

    fn opts(base: &Path) -> BundleOptions {
        BundleOptions::new(base)
            .with_order(IncludeOrder::Sorted)
            .with_guard(true)
    }

    fn run(base: &Path, roots: &[&str]) -> Result<BundleContext, BundleError> {
        let opts = opts(base);
        let inliner = Inliner::new(&opts);
        let mut ctx = BundleContext::new();
        for root in roots {
            inliner.inline_root(Path::new(root), &mut ctx)?;
        }
        Ok(ctx)
    }

    #[test]
    fn test_single_file_body_and_separator() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("a.hpp"),
            "#pragma once\n\nint a();\nint b();\n",
        )
        .unwrap();

        let ctx = run(tmp.path(), &["a.hpp"]).unwrap();
        assert_eq!(ctx.body(), "int a();\nint b();\n\n");
        assert!(ctx.system_includes().is_empty());
    }

    #[test]
    fn test_nested_include_expands_in_place() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("inner.hpp"), "#pragma once\nint inner();\n").unwrap();
        fs::write(
            tmp.path().join("outer.hpp"),
            "#pragma once\n#include \"inner.hpp\"\nint outer();\n",
        )
        .unwrap();

        let ctx = run(tmp.path(), &["outer.hpp"]).unwrap();
        // Depth-first pre-order: inner's block lands before outer's.
        assert_eq!(ctx.body(), "int inner();\n\nint outer();\n\n");
    }

    #[test]
    fn test_idempotent_expansion() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("shared.hpp"), "int shared();\n").unwrap();
        fs::write(
            tmp.path().join("a.hpp"),
            "#include \"shared.hpp\"\nint a();\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("b.hpp"),
            "#include \"shared.hpp\"\nint b();\n",
        )
        .unwrap();

        let ctx = run(tmp.path(), &["a.hpp", "b.hpp"]).unwrap();
        assert_eq!(
            ctx.body().matches("int shared();").count(),
            1,
            "shared header must be inlined exactly once"
        );
    }

    #[test]
    fn test_root_not_reexpanded_by_later_include() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("schema.hpp"), "int schema();\n").unwrap();
        fs::write(
            tmp.path().join("query.hpp"),
            "#include \"schema.hpp\"\n#include <vector>\nint query();\n",
        )
        .unwrap();

        let ctx = run(tmp.path(), &["schema.hpp", "query.hpp"]).unwrap();
        assert_eq!(ctx.body().matches("int schema();").count(), 1);
        assert_eq!(ctx.system_includes(), ["#include <vector>"]);
    }

    #[test]
    fn test_phase_boundary_stops_expansion() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("early.hpp"), "int early();\n").unwrap();
        fs::write(tmp.path().join("late.hpp"), "int late();\n").unwrap();
        fs::write(
            tmp.path().join("root.hpp"),
            "#include \"early.hpp\"\n#include <array>\nint content();\n#include \"late.hpp\"\n",
        )
        .unwrap();

        let ctx = run(tmp.path(), &["root.hpp"]).unwrap();
        // The include below the first content line stays verbatim.
        assert!(ctx.body().contains("#include \"late.hpp\"\n"));
        assert!(!ctx.body().contains("int late();"));
        assert!(ctx.body().contains("int early();"));
    }

    #[test]
    fn test_system_includes_collected_in_phase_a_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("a.hpp"),
            "#include <vector>\nint a();\n#include <set>\n",
        )
        .unwrap();

        let ctx = run(tmp.path(), &["a.hpp"]).unwrap();
        assert_eq!(ctx.system_includes(), ["#include <vector>"]);
        assert!(ctx.body().contains("#include <set>\n"));
    }

    #[test]
    fn test_missing_include_is_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("root.hpp"),
            "#include \"nonexistent.hpp\"\nint x();\n",
        )
        .unwrap();

        let err = run(tmp.path(), &["root.hpp"]).unwrap_err();
        match err {
            BundleError::MissingInclude { include, referrer, .. } => {
                assert_eq!(include, "nonexistent.hpp");
                assert!(referrer.ends_with("root.hpp"));
            }
            other => panic!("expected MissingInclude, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = run(tmp.path(), &["absent.hpp"]).unwrap_err();
        assert!(matches!(err, BundleError::MissingRoot { .. }));
    }

    #[test]
    fn test_differently_spelled_cycle_is_detected() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        // a -> b -> a, but b spells the reference to a differently, so
        // literal identity cannot terminate the recursion.
        fs::write(
            tmp.path().join("a.hpp"),
            "#include \"b.hpp\"\nint a();\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("b.hpp"),
            "#include \"sub/../a.hpp\"\nint b();\n",
        )
        .unwrap();

        let err = run(tmp.path(), &["a.hpp"]).unwrap_err();
        match err {
            BundleError::CyclicInclude { chain } => {
                assert!(chain.len() >= 3);
                assert_eq!(chain.first(), chain.last());
            }
            other => panic!("expected CyclicInclude, got {:?}", other),
        }
    }

    #[test]
    fn test_exact_text_cycle_terminates_silently() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("a.hpp"),
            "#include \"b.hpp\"\nint a();\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("b.hpp"),
            "#include \"a.hpp\"\nint b();\n",
        )
        .unwrap();

        // The visited-before-recurse discipline terminates this case.
        let ctx = run(tmp.path(), &["a.hpp"]).unwrap();
        assert_eq!(ctx.body().matches("int a();").count(), 1);
        assert_eq!(ctx.body().matches("int b();").count(), 1);
    }

    #[test]
    fn test_path_dedupe_catches_spelling_variants() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(tmp.path().join("shared.hpp"), "int shared();\n").unwrap();
        fs::write(
            tmp.path().join("root.hpp"),
            "#include \"shared.hpp\"\n#include \"sub/../shared.hpp\"\nint root();\n",
        )
        .unwrap();

        let literal = BundleOptions::new(tmp.path()).with_dedupe(DedupeMode::Literal);
        let inliner = Inliner::new(&literal);
        let mut ctx = BundleContext::new();
        inliner.inline_root(Path::new("root.hpp"), &mut ctx).unwrap();
        assert_eq!(
            ctx.body().matches("int shared();").count(),
            2,
            "literal identity treats the spellings as distinct"
        );

        let by_path = BundleOptions::new(tmp.path()).with_dedupe(DedupeMode::Path);
        let inliner = Inliner::new(&by_path);
        let mut ctx = BundleContext::new();
        inliner.inline_root(Path::new("root.hpp"), &mut ctx).unwrap();
        assert_eq!(ctx.body().matches("int shared();").count(), 1);
    }

    #[test]
    fn test_strict_mode_rejects_near_miss_directives() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("root.hpp"),
            "#include\"tight.hpp\"\nint x();\n",
        )
        .unwrap();

        let strict = BundleOptions::new(tmp.path()).with_strict(true);
        let inliner = Inliner::new(&strict);
        let mut ctx = BundleContext::new();
        let err = inliner
            .inline_root(Path::new("root.hpp"), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, BundleError::MalformedDirective { .. }));

        // Default mode copies the near-miss through as content.
        let lax = BundleOptions::new(tmp.path());
        let inliner = Inliner::new(&lax);
        let mut ctx = BundleContext::new();
        inliner.inline_root(Path::new("root.hpp"), &mut ctx).unwrap();
        assert!(ctx.body().starts_with("#include\"tight.hpp\"\n"));
    }

    #[test]
    fn test_depth_limit_aborts() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("c.hpp"), "int c();\n").unwrap();
        fs::write(tmp.path().join("b.hpp"), "#include \"c.hpp\"\nint b();\n").unwrap();
        fs::write(tmp.path().join("a.hpp"), "#include \"b.hpp\"\nint a();\n").unwrap();

        let shallow = BundleOptions::new(tmp.path()).with_max_depth(2);
        let inliner = Inliner::new(&shallow);
        let mut ctx = BundleContext::new();
        let err = inliner
            .inline_root(Path::new("a.hpp"), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, BundleError::DepthExceeded { limit: 2, .. }));
    }

    #[test]
    fn test_file_without_trailing_newline() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.hpp"), "int a();").unwrap();

        let ctx = run(tmp.path(), &["a.hpp"]).unwrap();
        // The separator newline terminates the unterminated last line.
        assert_eq!(ctx.body(), "int a();\n");
    }

    #[test]
    fn test_whitespace_line_ends_header_scan() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("inner.hpp"), "int inner();\n").unwrap();
        fs::write(
            tmp.path().join("root.hpp"),
            "  \n#include \"inner.hpp\"\nint root();\n",
        )
        .unwrap();

        let ctx = run(tmp.path(), &["root.hpp"]).unwrap();
        // The whitespace line is content, so the include is never expanded.
        assert!(!ctx.body().contains("int inner();"));
        assert!(ctx.body().contains("#include \"inner.hpp\"\n"));
    }
}
