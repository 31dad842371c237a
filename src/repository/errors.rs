use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("record not found")]
    NotFound,
    /// A unique constraint rejected the write.
    #[error("duplicate value: {0}")]
    Conflict(String),
    #[error("foreign key violation: {0}")]
    ForeignKey(String),
    /// A stored row failed domain validation on the way out.
    #[error("invalid stored value: {0}")]
    ValidationError(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::Conflict(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ForeignKey(info.message().to_string())
            }
            other => Self::Database(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
