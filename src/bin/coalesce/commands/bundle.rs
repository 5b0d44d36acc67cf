//! `coalesce bundle` command

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::cli::BundleArgs;
use coalesce::engine::emit::{BundleOptions, DedupeMode, IncludeOrder};
use coalesce::engine::errors::BundleError;
use coalesce::ops::{bundle_plan, bundle_to_disk};
use coalesce::util::diagnostic;

use super::resolve_graph_settings;

pub fn execute(args: BundleArgs, color: bool) -> Result<()> {
    let settings = resolve_graph_settings(&args.roots, args.base_dir.as_deref())?;
    let config = settings.manifest.as_ref().map(|m| &m.bundle);

    // CLI overrides manifest
    let guard = if args.no_guard {
        false
    } else if args.guard {
        true
    } else {
        config.map(|c| c.guard).unwrap_or(true)
    };

    let order = match &args.order {
        Some(s) => s
            .parse::<IncludeOrder>()
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        None => config.map(|c| c.order).unwrap_or_default(),
    };

    let dedupe = match &args.dedupe {
        Some(s) => s
            .parse::<DedupeMode>()
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        None => config.map(|c| c.dedupe).unwrap_or_default(),
    };

    let strict = args.strict || config.map(|c| c.strict).unwrap_or(false);

    let opts = BundleOptions::new(&settings.base_dir)
        .with_guard(guard)
        .with_order(order)
        .with_dedupe(dedupe)
        .with_strict(strict);

    if args.plan {
        let plan = match bundle_plan(&settings.roots, &opts) {
            Ok(plan) => plan,
            Err(e) => return fail(e, color),
        };
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let output = resolve_output(&args, &settings)?;

    let outcome = match bundle_to_disk(&settings.roots, &opts, &output) {
        Ok(outcome) => outcome,
        Err(e) => return fail(e, color),
    };

    eprintln!(
        "    Finished {} ({} headers, {} system includes, {} bytes)",
        outcome.output.display(),
        outcome.files,
        outcome.system_includes,
        outcome.bytes
    );

    Ok(())
}

/// Output path: CLI flag, then manifest (relative to its directory).
fn resolve_output(args: &BundleArgs, settings: &super::GraphSettings) -> Result<PathBuf> {
    if let Some(output) = &args.output {
        return Ok(output.clone());
    }

    if let (Some(manifest), Some(dir)) = (&settings.manifest, &settings.manifest_dir) {
        if let Some(output) = &manifest.bundle.output {
            return Ok(dir.join(output));
        }
    }

    bail!(
        "no output path given\n\
         help: pass --output or set `output` under [bundle] in Coalesce.toml"
    );
}

/// Surface engine errors as diagnostics, everything else verbatim.
fn fail(e: anyhow::Error, color: bool) -> Result<()> {
    if let Some(bundle_err) = e.downcast_ref::<BundleError>() {
        diagnostic::emit(&bundle_err.to_diagnostic(), color);
        std::process::exit(1);
    }
    Err(e)
}
