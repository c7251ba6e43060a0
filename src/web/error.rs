//! API error type
//!
//! Every handler failure ends up here and is rendered as `{"error": "..."}`
//! with a status derived from the [`ErrorKind`] of the underlying error.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Serialize;

use crate::convert::ConvertError;
use crate::error::ErrorKind;
use crate::templates::TemplateError;

/// API error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    PayloadTooLarge(String),
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    /// Map an error kind onto the matching variant
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::InvalidInput => AppError::BadRequest(message),
            ErrorKind::NotFound => AppError::NotFound(message),
            ErrorKind::ExternalToolUnavailable
            | ErrorKind::ConversionFailed
            | ErrorKind::Internal => AppError::Internal(message),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Internal(msg) => msg,
        }
    }

    fn from_status(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(message)
        } else if status.is_server_error() {
            AppError::Internal(message)
        } else {
            AppError::BadRequest(message)
        }
    }
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        AppError::from_kind(err.kind(), err.to_string())
    }
}

impl From<ConvertError> for AppError {
    fn from(err: ConvertError) -> Self {
        AppError::from_kind(err.kind(), err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::from_status(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::from_status(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::from_status(err.status(), err.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Task failed: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = self.message(), "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = self.message(), "request rejected");
        }

        let message = match self {
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Internal(msg) => msg,
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_template_errors_map_to_status() {
        let err = AppError::from(TemplateError::UnknownTemplate("x".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = AppError::from(TemplateError::InvalidExtension("a.txt".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = AppError::from(TemplateError::IoError(std::io::Error::other("disk")));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_convert_errors_map_to_status() {
        let err = AppError::from(ConvertError::ToolUnavailable {
            path: PathBuf::from("pandoc"),
            reason: "missing".into(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().contains("pandoc"));

        let err = AppError::from(ConvertError::ConversionFailed("bad input".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().contains("bad input"));
    }

    #[test]
    fn test_error_response_serialize() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "Template not found".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"Template not found"}"#);
    }

    #[test]
    fn test_from_status() {
        assert!(matches!(
            AppError::from_status(StatusCode::PAYLOAD_TOO_LARGE, "big".into()),
            AppError::PayloadTooLarge(_)
        ));
        assert!(matches!(
            AppError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad".into()),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from_status(StatusCode::UNSUPPORTED_MEDIA_TYPE, "bad".into()),
            AppError::BadRequest(_)
        ));
    }
}
