//! API error types and response formatting.
//!
//! Every error body has the shape `{ "msg": string }`. Validation failures
//! carry their message; transport and database failures are logged here and
//! answered with a fixed generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use castkit_core::ValidationError;
use serde::Serialize;

/// Body sent for every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// API error type that converts to appropriate HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was rejected before any downstream call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The upstream call failed in transport or returned a non-JSON body.
    #[error("upstream request for {route} failed: {source}")]
    Upstream {
        route: &'static str,
        source: reqwest::Error,
    },

    /// Postgres query error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// JSON error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub msg: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            Self::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::Upstream { route, source } => {
                tracing::error!(route = *route, error = %source, "upstream request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
            Self::Database(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { msg })).into_response()
    }
}
