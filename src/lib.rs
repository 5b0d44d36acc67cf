//! Coalesce - a single-header amalgamation tool for C/C++ header libraries
//!
//! This crate provides the core library functionality for Coalesce:
//! classifying include directives, recursively inlining local headers,
//! and emitting a merged single-header artifact.

pub mod core;
pub mod engine;
pub mod ops;
pub mod util;

pub use crate::core::line::{classify, LineKind};
pub use crate::core::manifest::{find_manifest, BundleConfig, Manifest};
pub use crate::engine::emit::{bundle, BundleOptions, DedupeMode, IncludeOrder};
pub use crate::engine::errors::BundleError;
