//! API error types and responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use coinshop_core::LedgerError;
use coinshop_store::StoreError;

use crate::config::ConfigError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Bad request - invalid input or a rejected operation.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    errors: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { errors: message })).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Unauthorized => Self::Unauthorized,
            LedgerError::Storage(msg) => Self::Internal(msg),
            LedgerError::InvalidCatalog(_) => Self::Internal(err.to_string()),
            LedgerError::AccountNotFound { .. }
            | LedgerError::ItemNotFound { .. }
            | LedgerError::InsufficientBalance { .. }
            | LedgerError::AlreadyExists { .. }
            | LedgerError::InvalidAmount(_)
            | LedgerError::SelfTransfer
            | LedgerError::InvalidId(_) => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Errors that prevent the service from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Invalid or missing configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The store could not be opened or migrated.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The catalog or hasher could not be built.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
