//! Error types for todo operations

use thiserror::Error;
use todo_storage::todo::TodoStorageError;

use crate::attachment_storage::BucketError;

/// Result type for todo operations
pub type TodoResult<T> = Result<T, TodoError>;

/// Errors that can occur during todo operations
///
/// Store failures are passed through untouched; nothing here retries.
#[derive(Error, Debug)]
pub enum TodoError {
    /// The todo table rejected or failed the operation
    #[error(transparent)]
    Storage(#[from] TodoStorageError),

    /// The upload authorization could not be issued
    #[error(transparent)]
    Attachment(#[from] BucketError),
}
