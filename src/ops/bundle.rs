//! Bundle-to-disk operation.
//!
//! Runs the engine over the configured roots and persists the artifact,
//! or emits a JSON bundle plan describing what a run would produce.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::engine::emit::{compose, dedup_includes, traverse, BundleOptions};
use crate::util::fs;

/// Result of writing a bundle to disk.
#[derive(Debug, Clone)]
pub struct BundleOutcome {
    /// Where the artifact was written.
    pub output: PathBuf,

    /// SHA-256 of the artifact text.
    pub digest: String,

    /// Artifact size in bytes.
    pub bytes: usize,

    /// Number of headers inlined.
    pub files: usize,

    /// Number of distinct system includes hoisted.
    pub system_includes: usize,
}

/// A machine-readable description of a bundling run.
///
/// Emitted by `coalesce bundle --plan` for downstream drivers
/// (compilers, benchmark runners) that want to know what the artifact
/// will contain without parsing it.
#[derive(Debug, Clone, Serialize)]
pub struct BundlePlan {
    /// Roots in traversal order.
    pub roots: Vec<PathBuf>,

    /// Every header inlined, in visitation order.
    pub files: Vec<PathBuf>,

    /// Deduplicated system includes in emission order.
    pub system_includes: Vec<String>,

    /// Whether the artifact carries a guard line.
    pub guard: bool,

    /// SHA-256 of the artifact text the run would produce.
    pub digest: String,

    /// Artifact size in bytes.
    pub bytes: usize,
}

/// Bundle the roots and write the artifact to `output`.
///
/// The artifact is only written after the whole traversal succeeds;
/// a failed run leaves no partial file behind.
pub fn bundle_to_disk(
    roots: &[PathBuf],
    opts: &BundleOptions,
    output: &Path,
) -> Result<BundleOutcome> {
    let ctx = traverse(roots, opts)?;
    let artifact = compose(&ctx, opts);
    let digest = digest(&artifact);

    fs::write_string(output, &artifact)
        .with_context(|| format!("failed to write artifact: {}", output.display()))?;

    tracing::info!(
        "bundled {} headers into {} ({} bytes, sha256 {})",
        ctx.files().len(),
        output.display(),
        artifact.len(),
        &digest[..12]
    );

    Ok(BundleOutcome {
        output: output.to_path_buf(),
        digest,
        bytes: artifact.len(),
        files: ctx.files().len(),
        system_includes: dedup_includes(ctx.system_includes(), opts.order).len(),
    })
}

/// Compute the bundle plan without writing anything.
pub fn bundle_plan(roots: &[PathBuf], opts: &BundleOptions) -> Result<BundlePlan> {
    let ctx = traverse(roots, opts)?;
    let artifact = compose(&ctx, opts);
    let system_includes = dedup_includes(ctx.system_includes(), opts.order);

    Ok(BundlePlan {
        roots: roots.to_vec(),
        files: ctx.files().to_vec(),
        system_includes,
        guard: opts.guard,
        digest: digest(&artifact),
        bytes: artifact.len(),
    })
}

fn digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use tempfile::TempDir;

    fn fixture(tmp: &TempDir) -> Vec<PathBuf> {
        stdfs::write(
            tmp.path().join("inner.hpp"),
            "#pragma once\n#include <vector>\nint inner();\n",
        )
        .unwrap();
        stdfs::write(
            tmp.path().join("root.hpp"),
            "#pragma once\n#include \"inner.hpp\"\n#include <array>\nint root();\n",
        )
        .unwrap();
        vec![PathBuf::from("root.hpp")]
    }

    #[test]
    fn test_bundle_to_disk() {
        let tmp = TempDir::new().unwrap();
        let roots = fixture(&tmp);
        let output = tmp.path().join("out/single.hpp");

        let outcome =
            bundle_to_disk(&roots, &BundleOptions::new(tmp.path()), &output).unwrap();

        assert_eq!(outcome.files, 2);
        assert_eq!(outcome.system_includes, 2);
        let written = stdfs::read_to_string(&output).unwrap();
        assert_eq!(written.len(), outcome.bytes);
        assert!(written.contains("int inner();"));
    }

    #[test]
    fn test_failed_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        stdfs::write(
            tmp.path().join("root.hpp"),
            "#include \"gone.hpp\"\nint root();\n",
        )
        .unwrap();
        let output = tmp.path().join("single.hpp");

        let result = bundle_to_disk(
            &[PathBuf::from("root.hpp")],
            &BundleOptions::new(tmp.path()),
            &output,
        );

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_plan_matches_artifact() {
        let tmp = TempDir::new().unwrap();
        let roots = fixture(&tmp);
        let opts = BundleOptions::new(tmp.path());

        let plan = bundle_plan(&roots, &opts).unwrap();
        assert_eq!(plan.files.len(), 2);
        assert_eq!(
            plan.system_includes,
            ["#include <array>", "#include <vector>"]
        );

        let output = tmp.path().join("single.hpp");
        let outcome = bundle_to_disk(&roots, &opts, &output).unwrap();
        assert_eq!(plan.digest, outcome.digest);
        assert_eq!(plan.bytes, outcome.bytes);
    }

    #[test]
    fn test_plan_serializes() {
        let tmp = TempDir::new().unwrap();
        let roots = fixture(&tmp);

        let plan = bundle_plan(&roots, &BundleOptions::new(tmp.path())).unwrap();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["guard"], true);
        assert!(json["digest"].as_str().unwrap().len() == 64);
    }
}
