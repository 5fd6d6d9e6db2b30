//! crisp-util - Shared foundation for the crisp scanner and preprocessor.
//!
//! This crate provides the pieces every stage of the pipeline leans on:
//! the workspace-wide error type, the diagnostic reporting layer (a
//! pluggable [`Report`] sink behind a counting [`Handler`]), and the
//! published name-hash function used for macro lookup.

mod error;
mod hash;
mod report;

pub use error::{Error, Result};
pub use hash::name_hash;
pub use report::{Handler, Report, StderrReport};

// Re-export commonly used hash containers
pub use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
