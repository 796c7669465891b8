//! API response types
//!
//! Webhook and upload callers expect flat JSON bodies: `{ "success": true,
//! "results": [...] }` when work was done, `{ "message": "..." }` when
//! nothing needed doing and `{ "error": "..." }` on failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Successful response carrying a list of per-item results
#[derive(Debug, Serialize)]
pub struct ResultsResponse<T> {
    pub success: bool,
    pub results: Vec<T>,
}

impl<T: Serialize> ResultsResponse<T> {
    pub fn success(results: Vec<T>) -> Self {
        Self {
            success: true,
            results,
        }
    }
}

impl<T: Serialize> IntoResponse for ResultsResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Successful response for calls that had nothing to do
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
