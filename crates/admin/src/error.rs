//! Handler error types.

use thiserror::Error;

use crate::forms::ValidationErrors;

/// Handler errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The principal lacks the capability for this operation. Raised
    /// before any data access.
    #[error(transparent)]
    Denied(#[from] policy::Error),

    /// The submitted form failed validation; carries field-level
    /// messages for echoing back to the caller. Nothing was persisted.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The storage layer failed (including missing records).
    #[error(transparent)]
    Storage(#[from] storage::Error),

    /// Credential hashing failed.
    #[error("credential hashing failed: {0}")]
    Hash(String),
}

pub type Result<T> = std::result::Result<T, Error>;
