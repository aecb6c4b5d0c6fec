//! HTTP error mapping: `{ "error": message, "raw"?: text }` with a status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use examprep_core::ExamPrepError;
use serde::Serialize;

pub const GENERATION_FAILED: &str = "AI generation failed. Please try again.";
pub const MODEL_TIMEOUT: &str = "AI model timed out. Please try again.";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub raw: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            raw: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<ExamPrepError> for ApiError {
    fn from(err: ExamPrepError) -> Self {
        match err {
            ExamPrepError::Validation(msg) => Self::bad_request(msg),
            ExamPrepError::NotFound(msg) => Self::not_found(msg),
            ExamPrepError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            ExamPrepError::Extraction(msg) => {
                tracing::warn!("⚠️ Unreadable upload: {msg}");
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, msg)
            }
            ExamPrepError::ProviderTimeout { provider, secs } => {
                tracing::error!("⏱️ Provider '{provider}' timed out after {secs}s");
                Self::new(StatusCode::GATEWAY_TIMEOUT, MODEL_TIMEOUT)
            }
            ExamPrepError::Format { message, raw } => {
                tracing::warn!("⚠️ Rejected model output: {message}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message,
                    raw,
                }
            }
            e if e.is_provider_failure() => {
                tracing::error!("❌ Model provider failure: {e}");
                Self::new(StatusCode::BAD_GATEWAY, GENERATION_FAILED)
            }
            e => {
                tracing::error!("❌ Request failed: {e}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            raw: self.raw,
        };
        (self.status, Json(body)).into_response()
    }
}
