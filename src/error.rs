use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::analysis::ImageDecodeError;
use crate::llm::UpstreamCallError;
use crate::styling::MalformedResponseError;

/// Failures of the `/predict` flow, rendered as `{success: false, error}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid multipart upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Image analysis failed: {0}")]
    ImageDecode(#[from] ImageDecodeError),
    #[error("Styling request failed: {0}")]
    UpstreamCall(#[from] UpstreamCallError),
    #[error("Styling response was malformed: {0}")]
    MalformedResponse(#[from] MalformedResponseError),
    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Multipart(err) => err.status(),
            AppError::ImageDecode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UpstreamCall(_) | AppError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients; upstream details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(message) => message.clone(),
            AppError::Multipart(err) => err.body_text(),
            AppError::ImageDecode(_) => "Image processing failed".to_string(),
            AppError::UpstreamCall(_) => "AI failed to generate styling advice".to_string(),
            AppError::MalformedResponse(_) => {
                "AI output formatting error (check server logs)".to_string()
            }
            AppError::Storage(_) | AppError::Internal(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(json!({ "success": false, "error": self.public_message() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_failure_to_a_status() {
        assert_eq!(
            AppError::BadRequest("No file selected".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ImageDecodeError::Empty).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(UpstreamCallError::EmptyResponse).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(MalformedResponseError::Invalid("x".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Internal("join".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn hides_upstream_details_from_clients() {
        let err = AppError::from(UpstreamCallError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            message: "Invalid API Key".to_string(),
        });
        assert_eq!(err.public_message(), "AI failed to generate styling advice");
        assert!(err.to_string().contains("Invalid API Key"));
    }
}
