//! Unified error handling.
//!
//! Provides a single `AppError` that every route handler returns. The
//! `IntoResponse` impl maps the error taxonomy onto status codes -
//! Validation 400, Authentication 401, Authorization 403, NotFound 404,
//! Conflict 409, Internal 500 - and keeps storage detail out of client
//! responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::{AuthError, TokenError};
use crate::services::catalog::CatalogError;
use crate::services::orders::OrderError;
use crate::storage::StorageError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed outside a service.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Bearer token was missing or failed verification.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Image storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Valid credentials, insufficient role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code for this error.
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(err) => repository_status(err),
                AuthError::PasswordHash | AuthError::TokenIssue => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Token(err) => match err {
                TokenError::Missing | TokenError::Malformed => StatusCode::UNAUTHORIZED,
                TokenError::Expired | TokenError::Invalid => StatusCode::FORBIDDEN,
            },
            Self::Catalog(err) => match err {
                CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
                CatalogError::NotFound => StatusCode::NOT_FOUND,
                CatalogError::Repository(err) => repository_status(err),
                CatalogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Order(err) => match err {
                OrderError::Validation(_) => StatusCode::BAD_REQUEST,
                OrderError::ProductNotFound => StatusCode::NOT_FOUND,
                OrderError::InsufficientStock(_) => StatusCode::CONFLICT,
                OrderError::Repository(err) => repository_status(err),
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal detail is logged, not returned.
    fn message(&self) -> String {
        match self {
            Self::Auth(AuthError::InvalidCredentials) => "invalid credentials".to_owned(),
            Self::Auth(AuthError::UserAlreadyExists) => {
                "an account with this email already exists".to_owned()
            }
            other if other.status() == StatusCode::INTERNAL_SERVER_ERROR => {
                "internal server error".to_owned()
            }
            other => other.to_string(),
        }
    }
}

/// Map a repository failure onto a status code.
///
/// Unique-constraint violations surface as Conflict rather than leaking
/// as internal errors.
fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request error");
        }

        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_owned());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::Validation("empty cart".to_owned());
        assert_eq!(err.to_string(), "Bad request: empty cart");
    }

    #[test]
    fn test_taxonomy_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("x".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::NotFound("x".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Forbidden("x".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_errors_split_401_403() {
        assert_eq!(
            get_status(AppError::Token(TokenError::Missing)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Token(TokenError::Malformed)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Token(TokenError::Expired)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Token(TokenError::Invalid)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_auth_errors() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_order_errors() {
        assert_eq!(
            get_status(AppError::Order(OrderError::ProductNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::InsufficientStock(
                "insufficient stock for product 1".to_owned()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::Validation("x".to_owned()))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "email already exists".to_owned()
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = AppError::Internal("connection pool exhausted at 10.0.0.3".to_owned());
        assert_eq!(err.message(), "internal server error");
    }
}
