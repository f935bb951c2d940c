//! Outbox records, domain event payloads, and the idempotency ledger row.
//!
//! Outbox rows are append-only: no update, no delete, and no owned
//! "published" status. An external CDC connector tails the table and
//! republishes; publication state belongs to it, not to this core.
//!
//! Event type strings are versioned (`jd.summary.completed.v1`). A schema
//! change is a new version string and a new payload struct; old rows stay
//! as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Event type for a completed summary.
pub const SUMMARY_COMPLETED_V1: &str = "jd.summary.completed.v1";

/// Event type for a terminally failed request.
pub const SUMMARY_FAILED_V1: &str = "jd.summary.failed.v1";

/// One append-only transactional outbox row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl OutboxEvent {
    /// Create an outbox row for a serialized payload.
    pub fn new(
        aggregate_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            aggregate_type: aggregate_type.into(),
            aggregate_id: aggregate_id.into(),
            event_type: event_type.into(),
            payload,
            occurred_at: Utc::now(),
        }
    }
}

/// Payload of [`SUMMARY_COMPLETED_V1`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryCompleted {
    pub request_id: String,
    pub summary_id: Uuid,
    pub snapshot_id: Uuid,
    pub brand_name: String,
    pub position_name: String,
}

impl SummaryCompleted {
    /// Serialize into an outbox row keyed by the summary aggregate.
    pub fn into_outbox(self) -> Result<OutboxEvent> {
        let aggregate_id = self.summary_id.to_string();
        let payload = serde_json::to_value(&self).map_err(crate::error::IntakeError::storage)?;
        Ok(OutboxEvent::new(
            "job-summary",
            aggregate_id,
            SUMMARY_COMPLETED_V1,
            payload,
        ))
    }
}

/// Payload of [`SUMMARY_FAILED_V1`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryFailed {
    pub request_id: String,
    pub error_code: String,
    pub error_message: String,
    pub retryable: bool,
}

impl SummaryFailed {
    /// Serialize into an outbox row keyed by the processing record.
    pub fn into_outbox(self) -> Result<OutboxEvent> {
        let aggregate_id = self.request_id.clone();
        let payload = serde_json::to_value(&self).map_err(crate::error::IntakeError::storage)?;
        Ok(OutboxEvent::new(
            "jd-processing",
            aggregate_id,
            SUMMARY_FAILED_V1,
            payload,
        ))
    }
}

/// One row of the idempotent-consumption ledger.
///
/// Write-once; the existence of a row for (event_id, consumer_group) is the
/// sole source of truth for "already handled by this consumer group".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedEvent {
    pub event_id: String,
    pub consumer_group: String,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedEvent {
    /// Record a first-time consumption.
    pub fn new(event_id: impl Into<String>, consumer_group: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            consumer_group: consumer_group.into(),
            processed_at: Utc::now(),
        }
    }
}
