use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Everything that can stop an extraction or comparison run.
///
/// JSON and schema failures carry the raw model text so callers can log it
/// or decide to retry with an adjusted prompt.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid extraction task: {0}")]
    InvalidTask(String),

    #[error("Generation service unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Generation service timed out after {0:?}")]
    ModelTimeout(Duration),

    #[error("No JSON object found in model response")]
    NoJsonFound { raw: String },

    #[error("Model response contained malformed JSON: {reason}")]
    MalformedJson { reason: String, raw: String },

    #[error("Model response does not match the {shape} schema: {}", .problems.join(", "))]
    Schema {
        shape: &'static str,
        problems: Vec<String>,
        raw: String,
    },

    #[error("At least one proposal is required for comparison")]
    NoProposals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidTask,
    ModelUnavailable,
    ModelTimeout,
    NoJsonFound,
    MalformedJson,
    Schema,
    NoProposals,
}

impl ExtractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::InvalidTask(_) => ErrorKind::InvalidTask,
            ExtractionError::ModelUnavailable(_) => ErrorKind::ModelUnavailable,
            ExtractionError::ModelTimeout(_) => ErrorKind::ModelTimeout,
            ExtractionError::NoJsonFound { .. } => ErrorKind::NoJsonFound,
            ExtractionError::MalformedJson { .. } => ErrorKind::MalformedJson,
            ExtractionError::Schema { .. } => ErrorKind::Schema,
            ExtractionError::NoProposals => ErrorKind::NoProposals,
        }
    }

    /// Transient service failures. Recovery failures are not included: the
    /// service answered, and repeating the same prompt is not expected to converge.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExtractionError::ModelUnavailable(_) | ExtractionError::ModelTimeout(_)
        )
    }

    /// Raw model output attached to recovery and schema failures.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            ExtractionError::NoJsonFound { raw }
            | ExtractionError::MalformedJson { raw, .. }
            | ExtractionError::Schema { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Attaches the raw response to a schema failure raised before it was known.
    pub(crate) fn with_raw(self, text: &str) -> Self {
        match self {
            ExtractionError::Schema {
                shape, problems, ..
            } => ExtractionError::Schema {
                shape,
                problems,
                raw: text.to_string(),
            },
            other => other,
        }
    }
}

impl From<LlmError> for ExtractionError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout(after) => ExtractionError::ModelTimeout(after),
            // reqwest reports its own deadline without the duration
            other if other.is_timeout() => ExtractionError::ModelTimeout(Duration::ZERO),
            other => ExtractionError::ModelUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_timeout_maps_to_model_timeout() {
        let e: ExtractionError = LlmError::Timeout(Duration::from_secs(30)).into();
        assert_eq!(e.kind(), ErrorKind::ModelTimeout);
        assert!(e.is_retryable());
    }

    #[test]
    fn test_llm_api_error_maps_to_unavailable() {
        let e: ExtractionError = LlmError::Api {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(e.kind(), ErrorKind::ModelUnavailable);
        assert!(e.to_string().contains("boom"));
    }

    #[test]
    fn test_decode_error_maps_to_unavailable() {
        let e: ExtractionError = LlmError::Decode("missing field".to_string()).into();
        assert_eq!(e.kind(), ErrorKind::ModelUnavailable);
    }

    #[test]
    fn test_recovery_errors_are_not_retryable() {
        let e = ExtractionError::NoJsonFound {
            raw: "nope".to_string(),
        };
        assert!(!e.is_retryable());
        assert_eq!(e.raw_response(), Some("nope"));
        assert!(!ExtractionError::NoProposals.is_retryable());
    }

    #[test]
    fn test_schema_error_lists_problems() {
        let e = ExtractionError::Schema {
            shape: "comparison",
            problems: vec!["vendor_rankings[0].vendor".to_string(), "x".to_string()],
            raw: String::new(),
        };
        assert_eq!(
            e.to_string(),
            "Model response does not match the comparison schema: vendor_rankings[0].vendor, x"
        );
    }

    #[test]
    fn test_with_raw_only_touches_schema_errors() {
        let e = ExtractionError::Schema {
            shape: "rfp",
            problems: vec![],
            raw: String::new(),
        }
        .with_raw("{}");
        assert_eq!(e.raw_response(), Some("{}"));

        let e = ExtractionError::NoProposals.with_raw("{}");
        assert!(e.raw_response().is_none());
    }
}
