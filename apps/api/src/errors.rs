use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::error::{ErrorKind, ExtractionError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Model timeout: {0}")]
    ModelTimeout(String),

    /// The service answered but its output could not be turned into a record.
    #[error("Extraction failed ({kind:?}): {message}")]
    ExtractionFailed { kind: ErrorKind, message: String },
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        match e.kind() {
            ErrorKind::InvalidTask | ErrorKind::NoProposals => AppError::Validation(e.to_string()),
            ErrorKind::ModelUnavailable => AppError::ModelUnavailable(e.to_string()),
            ErrorKind::ModelTimeout => AppError::ModelTimeout(e.to_string()),
            kind @ (ErrorKind::NoJsonFound | ErrorKind::MalformedJson | ErrorKind::Schema) => {
                if let Some(raw) = e.raw_response() {
                    tracing::debug!("Unusable model response: {raw}");
                }
                AppError::ExtractionFailed {
                    kind,
                    message: e.to_string(),
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "MODEL_UNAVAILABLE",
                    "The AI service is unavailable. Make sure Ollama is running.".to_string(),
                )
            }
            AppError::ModelTimeout(msg) => {
                tracing::error!("Model timeout: {msg}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "MODEL_TIMEOUT",
                    "The AI service took too long to respond. Try again.".to_string(),
                )
            }
            AppError::ExtractionFailed { kind, message } => {
                tracing::warn!("Extraction failed ({kind:?}): {message}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTRACTION_FAILED",
                    "Processing failed, try again.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn status_of(e: ExtractionError) -> StatusCode {
        AppError::from(e).into_response().status()
    }

    #[test]
    fn test_extraction_errors_map_to_statuses() {
        assert_eq!(
            status_of(ExtractionError::InvalidTask("empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ExtractionError::NoProposals), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ExtractionError::ModelUnavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ExtractionError::ModelTimeout(Duration::from_secs(5))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(ExtractionError::NoJsonFound { raw: "no".into() }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ExtractionError::Schema {
                shape: "comparison",
                problems: vec![],
                raw: String::new()
            }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_recovery_failure_keeps_kind() {
        let e = AppError::from(ExtractionError::MalformedJson {
            reason: "EOF".into(),
            raw: "{".into(),
        });
        assert!(matches!(
            e,
            AppError::ExtractionFailed {
                kind: ErrorKind::MalformedJson,
                ..
            }
        ));
    }
}
