//! Chain Graph Storage
//!
//! This crate provides the chain arena with indexed access:
//! - Element and dependency storage keyed by id
//! - Parent/child and swimlane membership bookkeeping
//! - Type index: Find elements by type
//! - Pair index: Find the dependency between two elements

mod chain;
mod index;

pub use chain::*;
