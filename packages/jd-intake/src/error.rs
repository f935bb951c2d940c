//! Typed errors for the intake core.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Storage adapters translate
//! backend-specific failures into these variants at the narrowest boundary;
//! raw driver errors never propagate upward.

use thiserror::Error;

use crate::types::processing::ProcessingStatus;

/// Errors that can occur during intake and pipeline operations.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Bad intake input, rejected before pipeline entry
    #[error("invalid intake input: {reason}")]
    Validation { reason: String },

    /// Content with this hash already exists (unique-constraint translation)
    #[error("content already ingested: {content_hash}")]
    DuplicateContent { content_hash: String },

    /// The LLM call exceeded its configured timeout
    #[error("LLM call timed out")]
    LlmTimeout,

    /// The LLM call itself failed (transport, provider, quota)
    #[error("LLM call failed: {0}")]
    LlmCall(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The LLM output could not be parsed into a summary
    #[error("LLM response parse error: {0}")]
    LlmParse(#[source] serde_json::Error),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A record that must exist is missing. Ids are internally generated and
    /// never guessed by callers, so this indicates a broken invariant.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A state transition the status machine forbids
    #[error("illegal processing transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: ProcessingStatus,
        to: ProcessingStatus,
    },
}

impl IntakeError {
    /// Stable error code recorded on FAILED processing rows.
    pub fn error_code(&self) -> &'static str {
        match self {
            IntakeError::Validation { .. } => "VALIDATION_FAILED",
            IntakeError::DuplicateContent { .. } => "DUPLICATE_CONTENT",
            IntakeError::LlmTimeout => "LLM_TIMEOUT",
            IntakeError::LlmCall(_) => "LLM_CALL_FAILED",
            IntakeError::LlmParse(_) => "LLM_RESPONSE_PARSE_FAILED",
            IntakeError::Storage(_)
            | IntakeError::NotFound { .. }
            | IntakeError::InvalidTransition { .. } => "INTERNAL_ERROR",
        }
    }

    /// Whether a caller may retry the same request and expect a different
    /// outcome. Parse failures are deterministic for the same input and are
    /// therefore not retryable.
    pub fn retryable(&self) -> bool {
        matches!(self, IntakeError::LlmTimeout | IntakeError::LlmCall(_))
    }

    /// Shorthand for the missing-record variant.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        IntakeError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wrap a backend error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        IntakeError::Storage(Box::new(err))
    }
}

/// Result type alias for intake operations.
pub type Result<T> = std::result::Result<T, IntakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(IntakeError::LlmTimeout.error_code(), "LLM_TIMEOUT");
        assert_eq!(
            IntakeError::Validation {
                reason: "empty".into()
            }
            .error_code(),
            "VALIDATION_FAILED"
        );
    }

    #[test]
    fn test_retryable_flags() {
        assert!(IntakeError::LlmTimeout.retryable());
        assert!(IntakeError::LlmCall("boom".into()).retryable());

        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!IntakeError::LlmParse(parse_err).retryable());
        assert!(!IntakeError::not_found("snapshot", "x").retryable());
    }
}
