use thiserror::Error;

use crate::media::MediaStoreError;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Input rejected before any side effect.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// Duplicate code, name or slug, or a category still in use.
    #[error("conflict: {0}")]
    Conflict(String),
    /// An upload that the operation depended on failed.
    #[error(transparent)]
    Media(#[from] MediaStoreError),
    /// A relational write failed; compensation has already run.
    #[error("transaction failed: {0}")]
    Transaction(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
