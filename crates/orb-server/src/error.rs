//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::features::cleanup::ReconcileError;
use crate::features::uploads::UploadAssetError;
use crate::storage::StoreError;

/// Errors returned by route handlers
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Store(e) => AppError::Store(e),
        }
    }
}

impl From<UploadAssetError> for AppError {
    fn from(err: UploadAssetError) -> Self {
        match err {
            UploadAssetError::Store(e @ StoreError::InvalidUpload(_)) => AppError::BadRequest(e.to_string()),
            UploadAssetError::Store(e) => AppError::Store(e),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::BadRequest(message) => {
                tracing::debug!(error = %message, "Rejected request");
            },
            AppError::Store(e) => {
                tracing::error!(error = %e, "Store error");
            },
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::bad_request("nope").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(StoreError::MissingCredentials).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upload_validation_is_bad_request() {
        let err = AppError::from(UploadAssetError::FileRequired);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No file uploaded");
    }

    #[test]
    fn test_rejected_upload_input_is_bad_request() {
        let err = AppError::from(UploadAssetError::InvalidContentType("image".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = AppError::from(UploadAssetError::Store(StoreError::InvalidUpload(
            "bad content type 'image'".to_string(),
        )));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid upload: bad content type 'image'");

        let err = AppError::from(UploadAssetError::Store(StoreError::MissingCredentials));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_credentials_message() {
        let err = AppError::from(ReconcileError::Store(StoreError::MissingCredentials));
        assert_eq!(err.to_string(), "Missing store credentials");
    }
}
