//! Common error types for the chain engine.

use crate::{DependencyId, ElementId};
use thiserror::Error;

/// Errors that can occur during chain storage operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Element not found.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// Dependency not found.
    #[error("Dependency not found: {0}")]
    DependencyNotFound(DependencyId),

    /// Element cannot own children.
    #[error("Element {0} is not a container")]
    NotAContainer(ElementId),

    /// Element is not a swimlane.
    #[error("Element {0} is not a swimlane")]
    NotASwimlane(ElementId),

    /// Invalid operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for chain storage operations.
pub type GraphResult<T> = Result<T, GraphError>;
