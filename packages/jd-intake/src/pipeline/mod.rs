//! The intake pipeline: duplicate decision, summarization, completion.

mod intake;
mod recovery;

pub use intake::{IntakeOutcome, IntakePipeline, IntakeRequest, SummarizeCommand};
pub use recovery::RecoveryReport;

use std::time::Duration;

use crate::simhash::calculator::SectionWeights;
use crate::simhash::similarity::DEFAULT_DUPLICATE_THRESHOLD;

/// Configuration for the intake pipeline.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Inclusive Hamming threshold for the near-duplicate gate
    pub near_duplicate_threshold: u32,

    /// Section weights fed into the SimHash calculator
    pub section_weights: SectionWeights,

    /// Upper bound on the LLM call
    pub llm_timeout: Duration,

    /// How many recent snapshots the near-duplicate scan reads per scope
    pub candidate_limit: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            near_duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            section_weights: SectionWeights::default(),
            llm_timeout: Duration::from_secs(30),
            candidate_limit: 64,
        }
    }
}

impl IntakeConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the near-duplicate threshold.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.near_duplicate_threshold = threshold;
        self
    }

    /// Set the section weights.
    pub fn with_section_weights(mut self, weights: SectionWeights) -> Self {
        self.section_weights = weights;
        self
    }

    /// Set the LLM timeout.
    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    /// Set the candidate scan bound.
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit;
        self
    }
}
