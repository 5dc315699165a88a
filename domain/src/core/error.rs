//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid payload kind: {0}")]
    InvalidPayloadKind(String),

    #[error("Participants requested as both speaker and bystander: {}", .0.join(", "))]
    AmbiguousRoleRequest(Vec<String>),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
