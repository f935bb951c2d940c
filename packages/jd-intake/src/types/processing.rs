//! Per-request processing lifecycle.
//!
//! `JdSummaryProcessing` is the orchestration root's record of one intake
//! request. It is keyed by the external request id, created exactly once at
//! intake, mutated only through the named transition methods below, and never
//! deleted (it doubles as the audit trail).
//!
//! Transitions are pure and synchronous; persistence happens outside. The
//! guards are strict: an illegal transition is an invariant violation, not a
//! recoverable condition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{IntakeError, Result};

/// Lifecycle states of one intake request.
///
/// ```text
/// RECEIVED ──► SUMMARIZING ──► COMPLETED
///    │              │     └──► FAILED
///    ├──► DUPLICATE ◄┘
///    └──► FAILED
/// ```
///
/// DUPLICATE, COMPLETED and FAILED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    Received,
    Summarizing,
    Duplicate,
    Completed,
    Failed,
}

impl ProcessingStatus {
    /// True for states no transition may leave.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessingStatus::Duplicate | ProcessingStatus::Completed | ProcessingStatus::Failed
        )
    }

    /// Stable string form for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Received => "RECEIVED",
            ProcessingStatus::Summarizing => "SUMMARIZING",
            ProcessingStatus::Duplicate => "DUPLICATE",
            ProcessingStatus::Completed => "COMPLETED",
            ProcessingStatus::Failed => "FAILED",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RECEIVED" => Some(ProcessingStatus::Received),
            "SUMMARIZING" => Some(ProcessingStatus::Summarizing),
            "DUPLICATE" => Some(ProcessingStatus::Duplicate),
            "COMPLETED" => Some(ProcessingStatus::Completed),
            "FAILED" => Some(ProcessingStatus::Failed),
            _ => None,
        }
    }

    fn allows(&self, to: ProcessingStatus) -> bool {
        match to {
            ProcessingStatus::Received => false,
            ProcessingStatus::Summarizing => *self == ProcessingStatus::Received,
            ProcessingStatus::Duplicate => {
                matches!(self, ProcessingStatus::Received | ProcessingStatus::Summarizing)
            }
            ProcessingStatus::Completed => *self == ProcessingStatus::Summarizing,
            ProcessingStatus::Failed => !self.is_terminal(),
        }
    }
}

/// The per-request state machine record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JdSummaryProcessing {
    /// External request id; primary key and correlation id
    pub request_id: String,

    pub status: ProcessingStatus,

    /// Snapshot bound on the transition to SUMMARIZING
    pub snapshot_id: Option<Uuid>,

    /// Raw LLM output, persisted by an independently committed unit of work
    /// so a crash after the LLM call never loses the expensive result
    pub llm_result_json: Option<String>,

    /// Brand name from the summarize command, saved with the LLM result
    pub command_brand_name: Option<String>,

    /// Position name from the summarize command, saved with the LLM result
    pub command_position_name: Option<String>,

    /// Why the request ended as DUPLICATE
    pub duplicate_reason: Option<String>,

    /// Summary bound on the transition to COMPLETED
    pub summary_id: Option<Uuid>,

    /// Caller-chosen error code, set on FAILED
    pub error_code: Option<String>,

    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl JdSummaryProcessing {
    /// Start processing for an external request. The request id must be
    /// globally unique (external contract, 1:1 with the intake request).
    pub fn start(request_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            request_id: request_id.into(),
            status: ProcessingStatus::Received,
            snapshot_id: None,
            llm_result_json: None,
            command_brand_name: None,
            command_position_name: None,
            duplicate_reason: None,
            summary_id: None,
            error_code: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn transition(&mut self, to: ProcessingStatus) -> Result<()> {
        if !self.status.allows(to) {
            return Err(IntakeError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// RECEIVED → SUMMARIZING, binding the snapshot to summarize.
    pub fn mark_summarizing(&mut self, snapshot_id: Uuid) -> Result<()> {
        self.transition(ProcessingStatus::Summarizing)?;
        self.snapshot_id = Some(snapshot_id);
        Ok(())
    }

    /// Record the raw LLM output and the command names it was produced for.
    ///
    /// Only valid while SUMMARIZING. The caller must persist this through its
    /// own, separately committed unit of work (see the pipeline).
    pub fn save_llm_result(
        &mut self,
        llm_result_json: impl Into<String>,
        brand_name: impl Into<String>,
        position_name: impl Into<String>,
    ) -> Result<()> {
        if self.status != ProcessingStatus::Summarizing {
            return Err(IntakeError::InvalidTransition {
                from: self.status,
                to: ProcessingStatus::Summarizing,
            });
        }
        self.llm_result_json = Some(llm_result_json.into());
        self.command_brand_name = Some(brand_name.into());
        self.command_position_name = Some(position_name.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Transition to DUPLICATE, ending the pipeline for this request.
    pub fn mark_duplicate(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(ProcessingStatus::Duplicate)?;
        self.duplicate_reason = Some(reason.into());
        Ok(())
    }

    /// SUMMARIZING → COMPLETED, binding the produced summary.
    pub fn mark_completed(&mut self, summary_id: Uuid) -> Result<()> {
        self.transition(ProcessingStatus::Completed)?;
        self.summary_id = Some(summary_id);
        Ok(())
    }

    /// Transition to FAILED with an explicit, caller-chosen error code.
    pub fn mark_failed(
        &mut self,
        error_code: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Result<()> {
        self.transition(ProcessingStatus::Failed)?;
        self.error_code = Some(error_code.into());
        self.error_message = Some(error_message.into());
        Ok(())
    }

    /// True if the LLM result survived a crash and only the post-LLM step
    /// remains (the recovery scan's predicate).
    pub fn is_resumable(&self) -> bool {
        self.status == ProcessingStatus::Summarizing && self.llm_result_json.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summarizing() -> JdSummaryProcessing {
        let mut p = JdSummaryProcessing::start("req-1");
        p.mark_summarizing(Uuid::new_v4()).unwrap();
        p
    }

    #[test]
    fn test_happy_path() {
        let mut p = JdSummaryProcessing::start("req-1");
        assert_eq!(p.status, ProcessingStatus::Received);

        let snapshot_id = Uuid::new_v4();
        p.mark_summarizing(snapshot_id).unwrap();
        assert_eq!(p.snapshot_id, Some(snapshot_id));

        p.save_llm_result("{}", "Acme", "Backend Engineer").unwrap();
        assert!(p.is_resumable());

        let summary_id = Uuid::new_v4();
        p.mark_completed(summary_id).unwrap();
        assert_eq!(p.status, ProcessingStatus::Completed);
        assert_eq!(p.summary_id, Some(summary_id));
    }

    #[test]
    fn test_duplicate_from_received_and_summarizing() {
        let mut p = JdSummaryProcessing::start("req-1");
        p.mark_duplicate("HASH").unwrap();
        assert_eq!(p.duplicate_reason.as_deref(), Some("HASH"));

        let mut p = summarizing();
        p.mark_duplicate("SIMHASH").unwrap();
        assert_eq!(p.status, ProcessingStatus::Duplicate);
    }

    #[test]
    fn test_failed_from_any_non_terminal() {
        let mut p = JdSummaryProcessing::start("req-1");
        p.mark_failed("VALIDATION_FAILED", "empty text").unwrap();
        assert_eq!(p.status, ProcessingStatus::Failed);

        let mut p = summarizing();
        p.mark_failed("LLM_TIMEOUT", "timed out").unwrap();
        assert_eq!(p.error_code.as_deref(), Some("LLM_TIMEOUT"));
    }

    #[test]
    fn test_terminal_states_reject_transitions() {
        let mut p = summarizing();
        p.mark_completed(Uuid::new_v4()).unwrap();

        assert!(matches!(
            p.mark_failed("X", "y"),
            Err(IntakeError::InvalidTransition { .. })
        ));
        assert!(matches!(
            p.mark_duplicate("HASH"),
            Err(IntakeError::InvalidTransition { .. })
        ));
        assert!(matches!(
            p.mark_summarizing(Uuid::new_v4()),
            Err(IntakeError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_completed_requires_summarizing() {
        let mut p = JdSummaryProcessing::start("req-1");
        assert!(matches!(
            p.mark_completed(Uuid::new_v4()),
            Err(IntakeError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_save_llm_result_requires_summarizing() {
        let mut p = JdSummaryProcessing::start("req-1");
        assert!(p.save_llm_result("{}", "Acme", "Engineer").is_err());
        assert!(!p.is_resumable());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ProcessingStatus::Received,
            ProcessingStatus::Summarizing,
            ProcessingStatus::Duplicate,
            ProcessingStatus::Completed,
            ProcessingStatus::Failed,
        ] {
            assert_eq!(ProcessingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProcessingStatus::parse("PENDING"), None);
    }
}
