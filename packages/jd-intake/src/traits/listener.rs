//! Post-commit lifecycle listener port.
//!
//! Invoked by the pipeline only after the completion or failure transaction
//! has durably committed. This is the best-effort tier: the pipeline catches
//! and logs listener errors and never rolls back or retries the committed
//! transaction on their account.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

/// Dispatched after a request completes.
#[derive(Debug, Clone)]
pub struct CompletionNotice {
    pub request_id: String,
    pub summary_id: Uuid,
    pub snapshot_id: Uuid,
    pub brand_name: String,
    pub position_name: String,
}

/// Dispatched after a request terminally fails.
#[derive(Debug, Clone)]
pub struct FailureNotice {
    pub request_id: String,
    pub error_code: String,
    pub error_message: String,
    /// Whether the caller may retry the same request
    pub retryable: bool,
    pub brand_name: Option<String>,
    pub position_name: Option<String>,
}

/// Receives terminal lifecycle notifications (SSE fan-out, push, etc.).
#[async_trait]
pub trait LifecycleListener: Send + Sync {
    /// A request reached COMPLETED.
    async fn on_completed(&self, notice: &CompletionNotice) -> Result<()>;

    /// A request reached FAILED.
    async fn on_failed(&self, notice: &FailureNotice) -> Result<()>;
}

/// Listener that does nothing. Useful when no notification tier is wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

#[async_trait]
impl LifecycleListener for NoopListener {
    async fn on_completed(&self, _notice: &CompletionNotice) -> Result<()> {
        Ok(())
    }

    async fn on_failed(&self, _notice: &FailureNotice) -> Result<()> {
        Ok(())
    }
}
