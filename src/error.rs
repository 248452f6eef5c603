use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use crate::genai::UpstreamError;

/// Custom error type for the application.
///
/// The payload carries the user-visible message for `BadRequest` and the raw
/// upstream details for the server-side variants.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    UpstreamEmpty(String),
    UpstreamApi(String),
    Internal(String),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg, None)
            }
            AppError::UpstreamEmpty(raw) => {
                error!("Upstream returned no text: {}", raw);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Gemini did not return text (possibly blocked by filters).".to_string(),
                    Some(raw),
                )
            }
            AppError::UpstreamApi(details) => {
                error!("Upstream API error: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Gemini API error".to_string(),
                    Some(details),
                )
            }
            AppError::Internal(details) => {
                error!("Unexpected server error: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected server error".to_string(),
                    Some(details),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        let details = err.to_string();
        match err {
            UpstreamError::NoText { raw } => AppError::UpstreamEmpty(raw),
            UpstreamError::Api { .. } => AppError::UpstreamApi(details),
            UpstreamError::Request(_) | UpstreamError::Decode(_) => AppError::Internal(details),
        }
    }
}

/// Result type for application handlers
pub type AppResult<T> = Result<T, AppError>;
