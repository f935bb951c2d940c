//! In-memory storage implementation for testing and development.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{IntakeError, Result};
use crate::traits::store::{
    OutboxLog, ProcessedEventStore, ProcessingStore, SnapshotFingerprint, SnapshotStore,
};
use crate::types::{
    events::OutboxEvent,
    processing::JdSummaryProcessing,
    snapshot::JobSnapshot,
    summary::JobSummary,
};

#[derive(Default)]
struct Inner {
    snapshots: HashMap<Uuid, JobSnapshot>,
    hash_index: HashMap<String, Uuid>,
    processings: HashMap<String, JdSummaryProcessing>,
    summaries: HashMap<Uuid, JobSummary>,
    outbox: Vec<OutboxEvent>,
    processed: HashSet<(String, String)>,
}

/// In-memory intake store.
///
/// Useful for tests and development; data is lost on drop. A single lock
/// guards all tables, which makes the completion/failure commits atomic the
/// same way a database transaction does.
#[derive(Default)]
pub struct MemoryIntakeStore {
    inner: RwLock<Inner>,
}

impl MemoryIntakeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub fn snapshot_count(&self) -> usize {
        self.inner.read().unwrap().snapshots.len()
    }

    /// Number of persisted summaries.
    pub fn summary_count(&self) -> usize {
        self.inner.read().unwrap().summaries.len()
    }

    /// Number of appended outbox rows.
    pub fn outbox_count(&self) -> usize {
        self.inner.read().unwrap().outbox.len()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        *inner = Inner::default();
    }

    fn require_processing(inner: &Inner, request_id: &str) -> Result<()> {
        if inner.processings.contains_key(request_id) {
            Ok(())
        } else {
            Err(IntakeError::not_found("processing", request_id))
        }
    }
}

#[async_trait]
impl SnapshotStore for MemoryIntakeStore {
    async fn insert_snapshot(&self, snapshot: &JobSnapshot) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.hash_index.contains_key(&snapshot.content_hash) {
            // Same signal the unique constraint produces in the SQL store.
            return Err(IntakeError::DuplicateContent {
                content_hash: snapshot.content_hash.clone(),
            });
        }
        inner
            .hash_index
            .insert(snapshot.content_hash.clone(), snapshot.id);
        inner.snapshots.insert(snapshot.id, snapshot.clone());
        Ok(())
    }

    async fn find_by_content_hash(&self, content_hash: &str) -> Result<Option<JobSnapshot>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .hash_index
            .get(content_hash)
            .and_then(|id| inner.snapshots.get(id))
            .cloned())
    }

    async fn find_by_source_url(
        &self,
        source_url: &str,
        brand_id: Option<Uuid>,
        position_id: Option<Uuid>,
    ) -> Result<Option<JobSnapshot>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .snapshots
            .values()
            .filter(|s| s.brand_id == brand_id && s.position_id == position_id)
            .find(|s| s.source_url.as_deref() == Some(source_url))
            .cloned())
    }

    async fn recent_fingerprints(
        &self,
        brand_id: Option<Uuid>,
        position_id: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<SnapshotFingerprint>> {
        let inner = self.inner.read().unwrap();
        let mut scoped: Vec<&JobSnapshot> = inner
            .snapshots
            .values()
            .filter(|s| s.brand_id == brand_id && s.position_id == position_id)
            .collect();
        scoped.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(scoped
            .into_iter()
            .take(limit)
            .map(|s| SnapshotFingerprint {
                snapshot_id: s.id,
                simhash: s.simhash,
            })
            .collect())
    }

    async fn get_snapshot(&self, id: Uuid) -> Result<Option<JobSnapshot>> {
        Ok(self.inner.read().unwrap().snapshots.get(&id).cloned())
    }
}

#[async_trait]
impl ProcessingStore for MemoryIntakeStore {
    async fn create_processing(&self, processing: &JdSummaryProcessing) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner
            .processings
            .insert(processing.request_id.clone(), processing.clone());
        Ok(())
    }

    async fn get_processing(&self, request_id: &str) -> Result<Option<JdSummaryProcessing>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .processings
            .get(request_id)
            .cloned())
    }

    async fn update_processing(&self, processing: &JdSummaryProcessing) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        Self::require_processing(&inner, &processing.request_id)?;
        inner
            .processings
            .insert(processing.request_id.clone(), processing.clone());
        Ok(())
    }

    async fn commit_completion(
        &self,
        processing: &JdSummaryProcessing,
        summary: &JobSummary,
        event: &OutboxEvent,
    ) -> Result<()> {
        // All three writes under one guard; nothing partial is observable.
        let mut inner = self.inner.write().unwrap();
        Self::require_processing(&inner, &processing.request_id)?;
        inner.summaries.insert(summary.id, summary.clone());
        inner.outbox.push(event.clone());
        inner
            .processings
            .insert(processing.request_id.clone(), processing.clone());
        Ok(())
    }

    async fn commit_failure(
        &self,
        processing: &JdSummaryProcessing,
        event: &OutboxEvent,
    ) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        Self::require_processing(&inner, &processing.request_id)?;
        inner.outbox.push(event.clone());
        inner
            .processings
            .insert(processing.request_id.clone(), processing.clone());
        Ok(())
    }

    async fn resumable(&self) -> Result<Vec<JdSummaryProcessing>> {
        let inner = self.inner.read().unwrap();
        let mut rows: Vec<JdSummaryProcessing> = inner
            .processings
            .values()
            .filter(|p| p.is_resumable())
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        Ok(rows)
    }

    async fn get_summary(&self, id: Uuid) -> Result<Option<JobSummary>> {
        Ok(self.inner.read().unwrap().summaries.get(&id).cloned())
    }

    async fn summary_id_for_snapshot(&self, snapshot_id: Uuid) -> Result<Option<Uuid>> {
        let inner = self.inner.read().unwrap();
        let mut matching: Vec<&JobSummary> = inner
            .summaries
            .values()
            .filter(|s| s.snapshot_id == snapshot_id)
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching.first().map(|s| s.id))
    }
}

#[async_trait]
impl ProcessedEventStore for MemoryIntakeStore {
    async fn mark_processed(&self, event_id: &str, consumer_group: &str) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        Ok(inner
            .processed
            .insert((event_id.to_string(), consumer_group.to_string())))
    }
}

#[async_trait]
impl OutboxLog for MemoryIntakeStore {
    async fn events_for(&self, aggregate_id: &str) -> Result<Vec<OutboxEvent>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .outbox
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::section::CanonicalSections;
    use crate::types::snapshot::SourceType;

    fn snapshot(text: &str) -> JobSnapshot {
        JobSnapshot::new(SourceType::Text, text, CanonicalSections::new())
    }

    #[tokio::test]
    async fn test_insert_snapshot_rejects_duplicate_hash() {
        let store = MemoryIntakeStore::new();
        store.insert_snapshot(&snapshot("same text")).await.unwrap();

        let err = store.insert_snapshot(&snapshot("same text")).await.unwrap_err();
        assert!(matches!(err, IntakeError::DuplicateContent { .. }));
        assert_eq!(store.snapshot_count(), 1);
    }

    #[tokio::test]
    async fn test_recent_fingerprints_scoped_and_ordered() {
        let store = MemoryIntakeStore::new();
        let brand = Uuid::new_v4();
        let position = Uuid::new_v4();

        let older = snapshot("first")
            .with_brand(brand)
            .with_position(position)
            .with_fingerprint(1);
        let mut newer = snapshot("second")
            .with_brand(brand)
            .with_position(position)
            .with_fingerprint(2);
        newer.created_at = older.created_at + chrono::Duration::seconds(5);
        let other_scope = snapshot("third").with_fingerprint(3);

        store.insert_snapshot(&older).await.unwrap();
        store.insert_snapshot(&newer).await.unwrap();
        store.insert_snapshot(&other_scope).await.unwrap();

        let fps = store
            .recent_fingerprints(Some(brand), Some(position), 10)
            .await
            .unwrap();
        assert_eq!(fps.len(), 2);
        assert_eq!(fps[0].simhash, 2); // most recent first
        assert_eq!(fps[1].simhash, 1);
    }

    #[tokio::test]
    async fn test_commit_completion_missing_processing_leaves_nothing() {
        let store = MemoryIntakeStore::new();
        let snap = snapshot("text");

        let mut processing = JdSummaryProcessing::start("ghost");
        processing.mark_summarizing(snap.id).unwrap();
        let summary = JobSummary::from_llm(
            snap.id,
            "Acme",
            "Engineer",
            crate::types::summary::LlmSummary {
                career_type: "ANY".into(),
                career_years: None,
                summary: "s".into(),
                responsibilities: vec![],
                required_qualifications: vec![],
                preferred_qualifications: vec![],
                tech_stack: vec![],
                recruitment_process: vec![],
            },
        );
        let event = OutboxEvent::new("job-summary", summary.id.to_string(), "t", serde_json::json!({}));

        // The record was never created, so the commit must fail as a unit.
        let err = store
            .commit_completion(&processing, &summary, &event)
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::NotFound { .. }));
        assert_eq!(store.summary_count(), 0);
        assert_eq!(store.outbox_count(), 0);
    }

    #[tokio::test]
    async fn test_mark_processed_first_and_redelivery() {
        let store = MemoryIntakeStore::new();
        assert!(store.mark_processed("e1", "g1").await.unwrap());
        assert!(!store.mark_processed("e1", "g1").await.unwrap());
        assert!(store.mark_processed("e1", "g2").await.unwrap());
    }
}
