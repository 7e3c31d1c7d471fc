//! Error types for rei-calc.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rei_common::ValidationError;
use serde::Serialize;

use crate::document::DocumentError;

/// Calculator errors.
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CalcError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Document(DocumentError::Io { .. }) => "DOCUMENT_IO",
            Self::Document(_) => "DOCUMENT_INVALID",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Document(DocumentError::Io { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Document(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<DocumentError> for rei_common::Error {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Io { path, source } => {
                Self::Io(source).with_context(path.display().to_string())
            }
            other => Self::Parse(other.to_string()),
        }
    }
}

impl From<CalcError> for rei_common::Error {
    fn from(err: CalcError) -> Self {
        match err {
            CalcError::Validation(e) => e.into(),
            CalcError::Document(e) => e.into(),
            CalcError::InvalidRequest(msg) => Self::InvalidInput(msg),
        }
    }
}

/// API error body.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl IntoResponse for CalcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = serde_json::json!({
            "success": false,
            "error": ApiError {
                code: self.code().to_string(),
                message: self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CalcError::InvalidRequest("missing body".to_string());
        assert_eq!(err.to_string(), "Invalid request: missing body");
    }

    #[test]
    fn test_validation_into_response() {
        let err = CalcError::from(ValidationError::MissingField {
            field: "property.purchase_price".into(),
        });
        assert_eq!(err.code(), "VALIDATION_FAILED");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_document_error_status() {
        let err = CalcError::from(DocumentError::InvalidNumber {
            line: 4,
            label: "Purchase Price".into(),
            value: "lots".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "DOCUMENT_INVALID");
    }

    #[test]
    fn test_into_common_error() {
        let err: rei_common::Error = CalcError::InvalidRequest("bad".into()).into();
        assert_eq!(err.status_code(), 400);

        let missing: rei_common::Error = DocumentError::Io {
            path: "deals/oak.md".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }
        .into();
        assert_eq!(missing.status_code(), 500);
        assert!(missing.to_string().starts_with("deals/oak.md: IO error"));

        let bad_line: rei_common::Error = CalcError::from(DocumentError::Empty).into();
        assert!(matches!(bad_line, rei_common::Error::Parse(_)));
    }
}
