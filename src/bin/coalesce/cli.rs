//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Coalesce - single-header amalgamation for C/C++ libraries
#[derive(Parser)]
#[command(name = "coalesce")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge the root headers into a single-header artifact
    Bundle(BundleArgs),

    /// Display the local include tree
    Tree(TreeArgs),

    /// Statically check the include graph without bundling
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BundleArgs {
    /// Root headers, in order (defaults to the manifest's roots)
    pub roots: Vec<PathBuf>,

    /// Directory local includes resolve against
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Artifact path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit a `#pragma once` guard line
    #[arg(long, overrides_with = "no_guard")]
    pub guard: bool,

    /// Omit the guard line
    #[arg(long)]
    pub no_guard: bool,

    /// System-include block order: sorted or first-seen
    #[arg(long)]
    pub order: Option<String>,

    /// Visited-set identity: literal or path
    #[arg(long)]
    pub dedupe: Option<String>,

    /// Fail on malformed include directives
    #[arg(long)]
    pub strict: bool,

    /// Emit the bundle plan as JSON instead of writing the artifact
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Root headers to display (defaults to the manifest's roots)
    pub roots: Vec<PathBuf>,

    /// Directory local includes resolve against
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Recurse into already-printed headers
    #[arg(long)]
    pub duplicates: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Root headers to check (defaults to the manifest's roots)
    pub roots: Vec<PathBuf>,

    /// Directory local includes resolve against
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Emit the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
