use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use order_store::{LifecycleError, SubmitError};
use serde_json::json;
use thiserror::Error;
use types::errors::{CurveError, SpreadError, TransitionError};
use types::metal::UnknownMetal;

/// Central error type for the gateway.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Version conflict; the caller re-reads and retries.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Well-formed request refused by a lifecycle rule.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, "CONFLICT"),
            AppError::Unprocessable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg, "UNPROCESSABLE")
            }
            AppError::Internal(err) => {
                tracing::error!(%err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "error": code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}

impl From<UnknownMetal> for AppError {
    fn from(err: UnknownMetal) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<SpreadError> for AppError {
    fn from(err: SpreadError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<CurveError> for AppError {
    fn from(err: CurveError) -> Self {
        match err {
            CurveError::NotFound { .. } => AppError::NotFound(err.to_string()),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            // A spread the curve cannot price is a client-side problem:
            // either the spread or the published curve needs to change.
            SubmitError::Valuation(e) => AppError::BadRequest(e.to_string()),
            SubmitError::Storage(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Transition(e) => match e {
                TransitionError::NotFound { .. } => AppError::NotFound(e.to_string()),
                TransitionError::Conflict { .. } => AppError::Conflict(e.to_string()),
                _ => AppError::Unprocessable(e.to_string()),
            },
            LifecycleError::Storage(e) => AppError::Internal(e.into()),
        }
    }
}
