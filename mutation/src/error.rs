//! Mutation error types.

use chain_core::{ChainId, DependencyId, ElementId, GraphError};
use thiserror::Error;

/// Result type for mutation operations.
pub type MutationResult<T> = Result<T, MutationError>;

/// Errors that can occur during mutation execution.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Unknown element type: {name}")]
    UnknownType { name: String },

    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Dependency not found: {0}")]
    DependencyNotFound(DependencyId),

    #[error("Chain not found: {0}")]
    ChainNotFound(ChainId),

    #[error("Element transfer failed: {message}")]
    ElementTransfer { message: String },

    #[error("Element deletion failed: {message}")]
    ElementDeletion { message: String },

    #[error("Illegal state: {message}")]
    IllegalState { message: String },
}

impl MutationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }

    pub fn element_transfer(message: impl Into<String>) -> Self {
        Self::ElementTransfer {
            message: message.into(),
        }
    }

    pub fn element_deletion(message: impl Into<String>) -> Self {
        Self::ElementDeletion {
            message: message.into(),
        }
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// Returns true for rule violations caused by the request itself.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::UnknownType { .. })
    }

    /// Returns true when a referenced entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound(_) | Self::DependencyNotFound(_) | Self::ChainNotFound(_)
        )
    }
}

impl From<GraphError> for MutationError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::ElementNotFound(id) => Self::ElementNotFound(id),
            GraphError::DependencyNotFound(id) => Self::DependencyNotFound(id),
            GraphError::NotAContainer(id) => {
                Self::validation(format!("Element {} cannot contain children", id))
            }
            other => Self::illegal_state(other.to_string()),
        }
    }
}
