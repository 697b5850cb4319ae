//! Chain Core Types
//!
//! This crate provides the foundational types used throughout the chain engine:
//! - Identity types (ChainId, ElementId, DependencyId)
//! - Property values (the Value enum and the Properties map)
//! - Entity structures (ChainElement with its tagged kinds, Dependency)
//! - Common error types

mod element;
mod error;
mod id;
pub mod messages;
mod value;

pub use element::*;
pub use error::*;
pub use id::*;
pub use value::*;
