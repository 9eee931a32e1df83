//! Storage error type shared by the repository and service layers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced chat does not exist.
    #[error("chat not found")]
    NotFound,
    /// The database was unreachable or rejected the statement. There is no
    /// automatic retry; the next poll cycle re-reads.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
