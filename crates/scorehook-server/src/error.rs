use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scorehook_core::ValidationError;
use scorehook_notify::NotifyError;
use thiserror::Error;

use crate::routes::SubmitResponse;

/// Everything that can fail a submission request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Submission must be a JSON object")]
    NotAnObject,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("failed to render report: {0}")]
    Report(serde_json::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) | Self::NotAnObject | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Notify(_) => StatusCode::BAD_GATEWAY,
            Self::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client. Sink and rendering failures stay in
    /// the logs; the client only learns that delivery failed.
    pub fn public_message(&self) -> String {
        match self {
            Self::Notify(_) => "Failed to send scores to webhook".to_string(),
            Self::Report(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = SubmitResponse {
            success: false,
            error: Some(self.public_message()),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
