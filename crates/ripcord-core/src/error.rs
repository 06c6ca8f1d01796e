//! Domain errors - validation failures caught before anything touches the wire

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Bulk delete count must be between 2 and 100, got {0}")]
    BulkDeleteRange(usize),

    #[error("Message has not been edited")]
    NotEdited,

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
