//! API error types with flat JSON bodies: `{"error": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::extraction::ExtractionError;
use crate::video::VideoError;

/// How much OCR text is echoed back when nothing was recognised.
pub const DEBUG_TEXT_CHARS: usize = 1000;

pub const NO_VALUES_MESSAGE: &str = "No medical values detected in the report. Please ensure the image is clear and contains medical test results.";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_text: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Upload exceeds the size limit")]
    TooLarge,
    #[error("No medical values detected")]
    NoValuesDetected { debug_text: String },
    #[error("Not found: {0}")]
    NotFound(String),
    /// Logged in full, reported to the client as-is.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn no_values(ocr_text: &str) -> Self {
        ApiError::NoValuesDetected {
            debug_text: prefix_chars(ocr_text, DEBUG_TEXT_CHARS),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    debug_text: None,
                },
            ),
            ApiError::TooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    error: format!(
                        "File too large. Maximum size is {} MB",
                        crate::config::MAX_UPLOAD_BYTES / (1024 * 1024)
                    ),
                    debug_text: None,
                },
            ),
            ApiError::NoValuesDetected { debug_text } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: NO_VALUES_MESSAGE.to_string(),
                    debug_text: Some(debug_text),
                },
            ),
            ApiError::NotFound(detail) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: format!("Not found: {detail}"),
                    debug_text: None,
                },
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: detail,
                        debug_text: None,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedFormat(_) => ApiError::BadRequest(
                "Invalid file type. Please upload PNG, JPG, or PDF".into(),
            ),
            other => ApiError::Internal(format!("Error processing file: {other}")),
        }
    }
}

impl From<VideoError> for ApiError {
    fn from(err: VideoError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("Background task failed: {err}"))
    }
}

/// First `n` characters, never splitting a code point.
pub fn prefix_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 16).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn bad_request_is_flat_json() {
        let (status, json) = body_json(ApiError::BadRequest("Topic is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({"error": "Topic is required"}));
    }

    #[tokio::test]
    async fn no_values_carries_truncated_text() {
        let text = "é".repeat(1500);
        let (status, json) = body_json(ApiError::no_values(&text)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], NO_VALUES_MESSAGE);
        assert_eq!(json["debug_text"].as_str().unwrap().chars().count(), 1000);
    }

    #[tokio::test]
    async fn internal_keeps_message() {
        let (status, json) = body_json(ApiError::from(VideoError::NoScenes)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to generate script");
        assert!(json.get("debug_text").is_none());
    }

    #[test]
    fn unsupported_upload_is_bad_request() {
        let err = ApiError::from(ExtractionError::UnsupportedFormat("notes.txt".into()));
        assert!(matches!(err, ApiError::BadRequest(m) if m.contains("PNG, JPG, or PDF")));
    }

    #[test]
    fn prefix_is_char_safe() {
        assert_eq!(prefix_chars("añb", 2), "añ");
        assert_eq!(prefix_chars("ab", 10), "ab");
    }
}
