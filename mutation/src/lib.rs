//! Chain Mutation
//!
//! Execute write operations on a chain while enforcing containment,
//! multiplicity and dependency rules.
//!
//! Responsibilities:
//! - Validate mutations against the descriptor registry
//! - Maintain sibling priorities and swimlane membership
//! - Cascade deletions to descendants, dependencies and references
//! - Report every change as a [`ChainDiff`]
//!
//! # Module Structure
//!
//! - `executor` - `ChainEditor`, the atomic entry point for all operations
//! - `ops/` - element, dependency, ordering and swimlane services
//! - `validation` - shared containment and multiplicity checks
//! - `diff` - change accumulation
//! - `config` - engine settings
//! - `error` - error types for mutation failures

mod config;
mod diff;
mod error;
mod executor;
mod ops;
mod result;
mod validation;

pub use config::EngineConfig;
pub use diff::ChainDiff;
pub use error::{MutationError, MutationResult};
pub use executor::ChainEditor;
pub use result::MutationOutcome;
