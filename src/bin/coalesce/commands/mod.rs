//! Command implementations

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use coalesce::core::manifest::{find_manifest, Manifest};

pub mod bundle;
pub mod check;
pub mod completions;
pub mod tree;

/// Settings shared by every command that walks the include graph.
pub struct GraphSettings {
    /// Roots in traversal order, relative to `base_dir`.
    pub roots: Vec<PathBuf>,

    /// Directory local includes resolve against.
    pub base_dir: PathBuf,

    /// The manifest, if one was found.
    pub manifest: Option<Manifest>,

    /// Directory containing the manifest.
    pub manifest_dir: Option<PathBuf>,
}

/// Resolve roots and base directory from CLI arguments and the nearest
/// manifest. CLI values take precedence over manifest values.
pub fn resolve_graph_settings(
    cli_roots: &[PathBuf],
    cli_base_dir: Option<&Path>,
) -> Result<GraphSettings> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;

    let manifest_path = find_manifest(&cwd);
    let (manifest, manifest_dir) = match &manifest_path {
        Some(path) => {
            let manifest = Manifest::load(path)?;
            let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
            (Some(manifest), Some(dir))
        }
        None => (None, None),
    };

    let base_dir = match cli_base_dir {
        Some(dir) => dir.to_path_buf(),
        None => match (&manifest, &manifest_dir) {
            (Some(m), Some(dir)) => dir.join(&m.bundle.base_dir),
            _ => cwd.clone(),
        },
    };

    let roots = if !cli_roots.is_empty() {
        cli_roots.to_vec()
    } else if let Some(m) = &manifest {
        m.bundle.roots.clone()
    } else {
        Vec::new()
    };

    if roots.is_empty() {
        bail!(
            "no root headers given\n\
             help: pass roots on the command line or list them under \
             [bundle] roots in Coalesce.toml"
        );
    }

    Ok(GraphSettings {
        roots,
        base_dir,
        manifest,
        manifest_dir,
    })
}
