//! Storage traits for the intake core.
//!
//! The storage layer is split into focused traits:
//! - `SnapshotStore`: raw intake content keyed by exact hash
//! - `ProcessingStore`: the per-request state machine records and the
//!   completion/failure transactions
//! - `ProcessedEventStore`: the idempotent-consumption ledger
//! - `OutboxLog`: read access to appended outbox rows (tests/operators)
//! - `IntakeStore`: composite trait combining all of the above
//!
//! Adapters translate backend constraint violations into domain signals at
//! this boundary: a unique-violation on `content_hash` becomes
//! [`IntakeError::DuplicateContent`], a duplicate ledger insert becomes a
//! "already processed" result. Raw driver errors never cross this seam.
//!
//! [`IntakeError::DuplicateContent`]: crate::error::IntakeError::DuplicateContent

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{
    events::OutboxEvent,
    processing::JdSummaryProcessing,
    snapshot::JobSnapshot,
    summary::JobSummary,
};

/// A candidate row for the near-duplicate scan: just enough to compare
/// fingerprints without loading full snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotFingerprint {
    pub snapshot_id: Uuid,
    pub simhash: u64,
}

/// Persists raw intake content.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert a snapshot.
    ///
    /// The storage-level unique constraint on `content_hash` arbitrates
    /// concurrent inserts of identical content: the loser receives
    /// `IntakeError::DuplicateContent`, never a raw storage error.
    async fn insert_snapshot(&self, snapshot: &JobSnapshot) -> Result<()>;

    /// Exact-duplicate lookup by content hash.
    async fn find_by_content_hash(&self, content_hash: &str) -> Result<Option<JobSnapshot>>;

    /// Exact lookup by source URL within a (brand, position) scope.
    async fn find_by_source_url(
        &self,
        source_url: &str,
        brand_id: Option<Uuid>,
        position_id: Option<Uuid>,
    ) -> Result<Option<JobSnapshot>>;

    /// Fingerprints of existing snapshots in a (brand, position) scope,
    /// most recent first, at most `limit` rows.
    async fn recent_fingerprints(
        &self,
        brand_id: Option<Uuid>,
        position_id: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<SnapshotFingerprint>>;

    /// Fetch a snapshot by id.
    async fn get_snapshot(&self, id: Uuid) -> Result<Option<JobSnapshot>>;
}

/// Persists processing records, summaries, and their transactions.
#[async_trait]
pub trait ProcessingStore: Send + Sync {
    /// Insert a freshly started processing record.
    async fn create_processing(&self, processing: &JdSummaryProcessing) -> Result<()>;

    /// Fetch a processing record by request id.
    async fn get_processing(&self, request_id: &str) -> Result<Option<JdSummaryProcessing>>;

    /// Persist a transitioned record.
    ///
    /// Each call is its own unit of work, committed independently of any
    /// surrounding flow. The pipeline relies on this for `save_llm_result`:
    /// once this returns, the LLM output is durable no matter what happens
    /// to the rest of the request.
    async fn update_processing(&self, processing: &JdSummaryProcessing) -> Result<()>;

    /// Commit the completion path atomically: summary insert, outbox append,
    /// and the COMPLETED processing update in one transaction. Partial
    /// visibility of the three writes is never observable.
    async fn commit_completion(
        &self,
        processing: &JdSummaryProcessing,
        summary: &JobSummary,
        event: &OutboxEvent,
    ) -> Result<()>;

    /// Commit the failure path atomically: outbox append plus the FAILED
    /// processing update in one transaction.
    async fn commit_failure(
        &self,
        processing: &JdSummaryProcessing,
        event: &OutboxEvent,
    ) -> Result<()>;

    /// SUMMARIZING records with a saved LLM result, oldest first. These are
    /// the requests a recovery pass can finish without re-invoking the LLM.
    async fn resumable(&self) -> Result<Vec<JdSummaryProcessing>>;

    /// Fetch a persisted summary by id.
    async fn get_summary(&self, id: Uuid) -> Result<Option<JobSummary>>;

    /// Id of the summary produced from a snapshot, if one exists.
    async fn summary_id_for_snapshot(&self, snapshot_id: Uuid) -> Result<Option<Uuid>>;
}

/// The idempotent-consumption ledger.
#[async_trait]
pub trait ProcessedEventStore: Send + Sync {
    /// Attempt to record (event_id, consumer_group) as processed.
    ///
    /// Returns `true` on first-time insert and `false` if the pair was
    /// already recorded. Mutual exclusion comes solely from the storage
    /// unique constraint; no application-level locks.
    async fn mark_processed(&self, event_id: &str, consumer_group: &str) -> Result<bool>;
}

/// Read access to the outbox, for tests and operator inspection.
///
/// The CDC relay tails the table directly; nothing in this core reads the
/// outbox on the publish path.
#[async_trait]
pub trait OutboxLog: Send + Sync {
    /// Appended events for an aggregate id, in occurrence order.
    async fn events_for(&self, aggregate_id: &str) -> Result<Vec<OutboxEvent>>;
}

/// Composite storage trait used by the pipeline.
pub trait IntakeStore: SnapshotStore + ProcessingStore + ProcessedEventStore + OutboxLog {}

// Blanket implementation: anything implementing all four traits is an IntakeStore
impl<T: SnapshotStore + ProcessingStore + ProcessedEventStore + OutboxLog> IntakeStore for T {}
