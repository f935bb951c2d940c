//! Crash recovery for the post-LLM step.
//!
//! `save_llm_result` commits independently of the rest of the request, so a
//! crash between it and the completion transaction leaves a SUMMARIZING row
//! with the LLM output already saved. The recovery pass finds those rows and
//! re-runs only the post-LLM step; the LLM is never re-invoked.

use tracing::{info, warn};

use crate::error::Result;
use crate::pipeline::intake::IntakePipeline;
use crate::traits::{listener::LifecycleListener, store::IntakeStore, summarizer::Summarizer};

/// Outcome of one recovery sweep.
#[derive(Debug, Clone, Default)]
pub struct RecoveryReport {
    /// Requests completed by this sweep
    pub completed: Vec<String>,
    /// Requests that failed again, with the error code recorded
    pub failed: Vec<(String, String)>,
}

impl RecoveryReport {
    /// Number of requests the sweep attempted.
    pub fn attempted(&self) -> usize {
        self.completed.len() + self.failed.len()
    }
}

impl<S, A, L> IntakePipeline<S, A, L>
where
    S: IntakeStore,
    A: Summarizer,
    L: LifecycleListener,
{
    /// Finish every resumable request. One request failing does not abort
    /// the sweep.
    pub async fn recover(&self) -> Result<RecoveryReport> {
        let resumable = self.store().resumable().await?;
        if resumable.is_empty() {
            return Ok(RecoveryReport::default());
        }

        info!(count = resumable.len(), "resuming interrupted requests");
        let mut report = RecoveryReport::default();
        for processing in resumable {
            let request_id = processing.request_id;
            match self.finalize(&request_id).await {
                Ok(summary_id) => {
                    info!(request_id = %request_id, summary_id = %summary_id, "recovered");
                    report.completed.push(request_id);
                }
                Err(err) => {
                    warn!(request_id = %request_id, error = %err, "recovery failed");
                    report.failed.push((request_id, err.error_code().to_string()));
                }
            }
        }
        Ok(report)
    }
}
