//! JSON error responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use captioner_core::PipelineError;
use serde_json::json;

/// Error returned from a handler, rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Errors while streaming the multipart body, including the body limit.
    pub fn from_multipart(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let status = match &err {
            PipelineError::MissingImage
            | PipelineError::FileNotFound(_)
            | PipelineError::UnsupportedFormat { .. }
            | PipelineError::Decode { .. } => StatusCode::BAD_REQUEST,
            PipelineError::FileTooLarge { .. } | PipelineError::ImageTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            PipelineError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            PipelineError::Embedding { .. } | PipelineError::Decoder { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{} {}", self.status, self.message);
        } else {
            tracing::debug!("{} {}", self.status, self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
