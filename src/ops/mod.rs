//! High-level operations.
//!
//! This module contains the implementation of Coalesce commands.

pub mod bundle;
pub mod graph;

pub use bundle::{bundle_plan, bundle_to_disk, BundleOutcome, BundlePlan};
pub use graph::{check, include_graph, CheckReport, IncludeGraph};
