//! LLM summarization port.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::summary::{LlmSummary, SummarizeRequest};

/// Summarizes a JD's canonical sections into a structured summary.
///
/// Implementations wrap a specific LLM provider and own prompting and
/// response parsing. The pipeline never calls a provider directly; it bounds
/// this call with its configured timeout and records failures as terminal
/// FAILED transitions rather than propagating them.
///
/// Expected failure modes map onto [`IntakeError`]:
/// - call failure → `IntakeError::LlmCall` (retryable)
/// - malformed model output → `IntakeError::LlmParse` (not retryable)
/// - timeouts are enforced by the caller, not the implementation
///
/// [`IntakeError`]: crate::error::IntakeError
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize one request.
    async fn summarize(&self, request: &SummarizeRequest) -> Result<LlmSummary>;
}
