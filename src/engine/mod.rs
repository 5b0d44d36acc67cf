//! The amalgamation engine.
//!
//! A bundling run is a depth-first traversal of the local-include graph:
//! [`traversal::Inliner`] expands each root, threading shared state
//! through a [`context::BundleContext`], and [`emit`] composes the final
//! single-header artifact from the accumulated state.

pub mod context;
pub mod emit;
pub mod errors;
pub mod traversal;

pub use context::BundleContext;
pub use emit::{bundle, BundleOptions, DedupeMode, IncludeOrder};
pub use errors::BundleError;
pub use traversal::Inliner;
