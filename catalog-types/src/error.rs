//! Error types for the catalog service.

use exchange_rates::{MoneyError, RateFetchError};

use crate::domain::{AuthorId, BookId};

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    InvalidMoney(#[from] MoneyError),

    #[error("Book not found: {0}")]
    BookNotFound(BookId),

    #[error("Author not found: {0}")]
    AuthorNotFound(AuthorId),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Exchange rates unavailable: {0}")]
    RateUnavailable(#[from] RateFetchError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::BookNotFound(id) => AppError::NotFound(format!("Book not found: {id}")),
            DomainError::AuthorNotFound(id) => {
                AppError::NotFound(format!("Author not found: {id}"))
            }
            DomainError::ValidationError(msg) => AppError::BadRequest(msg),
            DomainError::InvalidMoney(e) => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Storage(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::BadRequest(e),
        }
    }
}
