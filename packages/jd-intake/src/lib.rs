//! JD intake deduplication and summarization pipeline core.
//!
//! Ingests job-description postings from heterogeneous sources, avoids
//! re-running expensive LLM summarization on content that is identical or
//! near-identical to something already processed, and guarantees that
//! downstream consumers see each successfully summarized JD exactly once
//! despite at-least-once delivery and partial failures.
//!
//! # Guarantees
//!
//! - **Exact dedup**: every snapshot is keyed by a SHA-256 content hash with
//!   a storage-level unique constraint, so concurrent identical intakes
//!   resolve to a single winner.
//! - **Near dedup**: a weighted 64-bit SimHash over the canonical section
//!   map catches reworded re-posts within a (brand, position) scope.
//! - **Crash-safe LLM results**: raw LLM output is persisted by an
//!   independently committed unit of work; a recovery pass resumes the
//!   post-LLM step without re-invoking the model.
//! - **No dual writes**: domain events are appended to a transactional
//!   outbox in the same transaction as the business state; an external CDC
//!   relay publishes them.
//! - **Idempotent consumption**: inbound redeliveries are gated on a
//!   (event id, consumer group) ledger backed by a composite primary key.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jd_intake::pipeline::{IntakeConfig, IntakeOutcome, IntakePipeline, IntakeRequest};
//! use jd_intake::stores::MemoryIntakeStore;
//! use jd_intake::testing::{sample_sections, MockSummarizer, RecordingListener};
//! use jd_intake::types::snapshot::SourceType;
//!
//! let pipeline = IntakePipeline::new(
//!     Arc::new(MemoryIntakeStore::new()),
//!     Arc::new(MockSummarizer::new()),
//!     Arc::new(RecordingListener::new()),
//!     IntakeConfig::default(),
//! );
//!
//! let request = IntakeRequest::new("req-1", SourceType::Text, "raw JD text", sample_sections());
//! match pipeline.intake(&request).await? {
//!     IntakeOutcome::Accepted { .. } => {
//!         pipeline.spawn_summarize(request.summarize_command());
//!     }
//!     IntakeOutcome::Duplicate(decision) => {
//!         // surface the existing snapshot/summary to the caller
//!     }
//! }
//! ```
//!
//! # Modules
//!
//! - [`hashing`] - exact content fingerprint
//! - [`normalize`] - deterministic text projection of a section map
//! - [`simhash`] - near-duplicate fingerprinting and classification
//! - [`dedup`] - the ordered duplicate decision
//! - [`consumer`] - idempotent consumption of at-least-once deliveries
//! - [`pipeline`] - the orchestration root and recovery sweep
//! - [`traits`] - storage and port seams
//! - [`stores`] - storage implementations (memory, Postgres)
//! - [`testing`] - mock ports and fixtures

pub mod consumer;
pub mod dedup;
pub mod error;
pub mod hashing;
pub mod normalize;
pub mod pipeline;
pub mod simhash;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use consumer::{consume_once, Consumption};
pub use dedup::{DuplicateDecision, DuplicateDetector, DuplicateReason};
pub use error::{IntakeError, Result};
pub use pipeline::{IntakeConfig, IntakeOutcome, IntakePipeline, IntakeRequest, RecoveryReport};
pub use simhash::{SectionWeights, SimHashCalculator, Similarity};
pub use traits::{IntakeStore, LifecycleListener, Summarizer};
