//! Response types for the compliance API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP status codes.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an empty body error response.
    pub fn empty_document() -> Self {
        Self::with_details(
            "EMPTY_DOCUMENT",
            "Request body is empty",
            "Send the schedule document as the raw request body",
        )
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a response from a status and body.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::FormatUnsupported {
                filename,
                content_type,
            } => ApiErrorResponse::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ApiError::with_details(
                    "FORMAT_UNSUPPORTED",
                    message,
                    format!(
                        "filename '{}' and content type '{}' match no delimited, spreadsheet or PDF format",
                        filename, content_type
                    ),
                ),
            ),
            EngineError::EmptyExtraction { reason } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details("EMPTY_EXTRACTION", "No table could be extracted", reason),
            ),
            EngineError::MissingColumns { missing, detected } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "MISSING_COLUMNS",
                    message,
                    serde_json::json!({ "missing": missing, "detected": detected }).to_string(),
                ),
            ),
            EngineError::UnparsableRow { .. } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("UNPARSABLE_ROW", message),
            ),
            EngineError::NoUsableRows { .. } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("NO_USABLE_ROWS", message),
            ),
            EngineError::RecognitionTimeout { .. } => ApiErrorResponse::new(
                StatusCode::GATEWAY_TIMEOUT,
                ApiError::with_details(
                    "RECOGNITION_TIMEOUT",
                    message,
                    "The document may be a long scan; retry later or send a digital export",
                ),
            ),
            EngineError::ConfigNotFound { .. } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::ConfigParseError { .. } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration parse error", message),
            ),
            EngineError::InvalidThresholds { field, .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details("INVALID_THRESHOLDS", message, field),
            ),
        }
    }
}
