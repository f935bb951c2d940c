//! Intake duplicate detection.
//!
//! Checks run cheapest first: exact content hash, then source URL for
//! scraped intakes, then the SimHash scan. The near-duplicate scan is scoped
//! to the snapshot's (brand, position) pair; comparing globally is not
//! attempted. Candidates are visited most-recent-first and the first one
//! within the threshold wins; no attempt is made to find the closest match.
//!
//! The hash check is race-protected by the storage unique constraint on
//! `content_hash`. The SimHash scan is best-effort and is not.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::simhash::similarity::hamming_distance;
use crate::traits::store::{ProcessingStore, SnapshotStore};
use crate::types::snapshot::JobSnapshot;

/// Why an intake was judged a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DuplicateReason {
    /// Identical content hash
    Hash,
    /// SimHash distance within the configured threshold
    SimHash,
    /// Trigram similarity (store-side extension; not emitted by this core)
    Trgm,
    /// Same source URL in the same scope
    Url,
}

impl DuplicateReason {
    /// Stable string form, recorded on DUPLICATE processing rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateReason::Hash => "HASH",
            DuplicateReason::SimHash => "SIMHASH",
            DuplicateReason::Trgm => "TRGM",
            DuplicateReason::Url => "URL",
        }
    }
}

/// Outcome of the intake duplicate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateDecision {
    NotDuplicate,
    Duplicate {
        reason: DuplicateReason,
        existing_snapshot_id: Uuid,
        existing_summary_id: Option<Uuid>,
    },
}

impl DuplicateDecision {
    /// True for either duplicate variant.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DuplicateDecision::Duplicate { .. })
    }
}

/// Produces tagged duplicate decisions for new snapshots.
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    threshold: u32,
    candidate_limit: usize,
}

impl DuplicateDetector {
    /// Create a detector with an inclusive Hamming threshold and a bound on
    /// how many recent candidates the SimHash scan reads.
    pub fn new(threshold: u32, candidate_limit: usize) -> Self {
        Self {
            threshold,
            candidate_limit,
        }
    }

    /// Decide whether `snapshot` duplicates existing content.
    ///
    /// `snapshot` must already carry its SimHash fingerprint.
    pub async fn detect<S>(&self, store: &S, snapshot: &JobSnapshot) -> Result<DuplicateDecision>
    where
        S: SnapshotStore + ProcessingStore + ?Sized,
    {
        // 1. Exact content hash.
        if let Some(existing) = store.find_by_content_hash(&snapshot.content_hash).await? {
            return self.found(store, DuplicateReason::Hash, existing.id).await;
        }

        // 2. Same source URL within the scope.
        if let Some(url) = &snapshot.source_url {
            if let Some(existing) = store
                .find_by_source_url(url, snapshot.brand_id, snapshot.position_id)
                .await?
            {
                return self.found(store, DuplicateReason::Url, existing.id).await;
            }
        }

        // 3. Near match over recent fingerprints in the same scope.
        let candidates = store
            .recent_fingerprints(snapshot.brand_id, snapshot.position_id, self.candidate_limit)
            .await?;
        for candidate in candidates {
            let distance = hamming_distance(snapshot.simhash, candidate.simhash);
            if distance <= self.threshold {
                debug!(
                    snapshot_id = %candidate.snapshot_id,
                    distance,
                    threshold = self.threshold,
                    "near-duplicate fingerprint match"
                );
                return self
                    .found(store, DuplicateReason::SimHash, candidate.snapshot_id)
                    .await;
            }
        }

        Ok(DuplicateDecision::NotDuplicate)
    }

    async fn found<S>(
        &self,
        store: &S,
        reason: DuplicateReason,
        existing_snapshot_id: Uuid,
    ) -> Result<DuplicateDecision>
    where
        S: SnapshotStore + ProcessingStore + ?Sized,
    {
        let existing_summary_id = store.summary_id_for_snapshot(existing_snapshot_id).await?;
        Ok(DuplicateDecision::Duplicate {
            reason,
            existing_snapshot_id,
            existing_summary_id,
        })
    }
}
