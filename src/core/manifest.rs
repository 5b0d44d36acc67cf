//! Coalesce.toml manifest parsing and schema.
//!
//! The manifest is the central configuration file for a bundle. It names
//! the ordered root headers, the directory local includes resolve
//! against, and the emission options. Every setting can be overridden
//! from the command line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::emit::{DedupeMode, IncludeOrder};

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Coalesce.toml";

/// The parsed Coalesce.toml manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Bundle settings from the `[bundle]` section.
    pub bundle: BundleConfig,
}

/// Bundle configuration from the `[bundle]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BundleConfig {
    /// Ordered entry-point headers, relative to `base-dir`.
    pub roots: Vec<PathBuf>,

    /// Directory local includes resolve against, relative to the
    /// manifest directory.
    pub base_dir: PathBuf,

    /// Artifact path, relative to the manifest directory.
    pub output: Option<PathBuf>,

    /// Emit a `#pragma once` guard at the top of the artifact.
    pub guard: bool,

    /// Ordering of the hoisted system-include block.
    pub order: IncludeOrder,

    /// Identity used by the visited set.
    pub dedupe: DedupeMode,

    /// Reject malformed include directives instead of passing them
    /// through as content.
    pub strict: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        BundleConfig {
            roots: Vec::new(),
            base_dir: PathBuf::from("."),
            output: None,
            guard: true,
            order: IncludeOrder::Sorted,
            dedupe: DedupeMode::Literal,
            strict: false,
        }
    }
}

impl Manifest {
    /// Load and parse a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        let manifest: Manifest = toml::from_str(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))?;

        Ok(manifest)
    }
}

/// Find the nearest `Coalesce.toml`, walking up from `start`.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_manifest() {
        let toml = r#"
            [bundle]
            roots = ["sql/schema.hpp", "sql/query.hpp"]
            base-dir = "include"
            output = "single-header/sql.hpp"
            guard = true
            order = "sorted"
            dedupe = "literal"
            strict = false
        "#;

        let manifest: Manifest = toml::from_str(toml).unwrap();
        assert_eq!(manifest.bundle.roots.len(), 2);
        assert_eq!(manifest.bundle.base_dir, PathBuf::from("include"));
        assert_eq!(
            manifest.bundle.output,
            Some(PathBuf::from("single-header/sql.hpp"))
        );
        assert!(manifest.bundle.guard);
        assert_eq!(manifest.bundle.order, IncludeOrder::Sorted);
        assert_eq!(manifest.bundle.dedupe, DedupeMode::Literal);
    }

    #[test]
    fn test_parse_defaults() {
        let manifest: Manifest = toml::from_str("").unwrap();
        assert!(manifest.bundle.roots.is_empty());
        assert_eq!(manifest.bundle.base_dir, PathBuf::from("."));
        assert!(manifest.bundle.guard);
        assert_eq!(manifest.bundle.order, IncludeOrder::Sorted);
        assert!(!manifest.bundle.strict);
    }

    #[test]
    fn test_parse_alternate_modes() {
        let toml = r#"
            [bundle]
            roots = ["lib.hpp"]
            order = "first-seen"
            dedupe = "path"
            guard = false
        "#;

        let manifest: Manifest = toml::from_str(toml).unwrap();
        assert_eq!(manifest.bundle.order, IncludeOrder::FirstSeen);
        assert_eq!(manifest.bundle.dedupe, DedupeMode::Path);
        assert!(!manifest.bundle.guard);
    }

    #[test]
    fn test_find_manifest_walks_up() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MANIFEST_NAME), "[bundle]\nroots = []\n").unwrap();

        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let found = find_manifest(&nested).unwrap();
        assert_eq!(found, tmp.path().join(MANIFEST_NAME));
    }

    #[test]
    fn test_find_manifest_missing() {
        let tmp = TempDir::new().unwrap();
        assert!(find_manifest(tmp.path()).is_none());
    }
}
