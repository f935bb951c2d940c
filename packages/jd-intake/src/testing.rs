//! Testing utilities: mock ports and fixtures.
//!
//! Useful for testing applications built on the pipeline without a real LLM
//! provider or notification tier.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{IntakeError, Result};
use crate::traits::{
    listener::{CompletionNotice, FailureNotice, LifecycleListener},
    summarizer::Summarizer,
};
use crate::types::section::{CanonicalSections, JdSection};
use crate::types::summary::{LlmSummary, SummarizeRequest};

#[derive(Clone)]
enum MockBehavior {
    Respond(LlmSummary),
    FailCall,
    /// Sleep before responding, to trip the pipeline's timeout
    Delay(Duration),
}

/// A mock summarizer with configurable behavior and call recording.
pub struct MockSummarizer {
    behavior: RwLock<MockBehavior>,
    calls: Arc<RwLock<Vec<SummarizeRequest>>>,
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSummarizer {
    /// Create a mock returning [`sample_llm_summary`].
    pub fn new() -> Self {
        Self {
            behavior: RwLock::new(MockBehavior::Respond(sample_llm_summary())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Return a specific summary.
    pub fn with_summary(self, summary: LlmSummary) -> Self {
        *self.behavior.write().unwrap() = MockBehavior::Respond(summary);
        self
    }

    /// Fail every call with a transient error.
    pub fn failing(self) -> Self {
        *self.behavior.write().unwrap() = MockBehavior::FailCall;
        self
    }

    /// Sleep before answering, to exercise the caller's timeout.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.behavior.write().unwrap() = MockBehavior::Delay(delay);
        self
    }

    /// Number of summarize calls received.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Requests received so far.
    pub fn calls(&self) -> Vec<SummarizeRequest> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, request: &SummarizeRequest) -> Result<LlmSummary> {
        self.calls.write().unwrap().push(request.clone());
        let behavior = self.behavior.read().unwrap().clone();
        match behavior {
            MockBehavior::Respond(summary) => Ok(summary),
            MockBehavior::FailCall => Err(IntakeError::LlmCall("mock provider down".into())),
            MockBehavior::Delay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(sample_llm_summary())
            }
        }
    }
}

/// A listener that records every notice it receives.
#[derive(Default)]
pub struct RecordingListener {
    completed: RwLock<Vec<CompletionNotice>>,
    failed: RwLock<Vec<FailureNotice>>,
    fail_calls: AtomicBool,
}

impl RecordingListener {
    /// Create a recording listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every callback return an error, to verify the pipeline treats
    /// listener failures as log-only.
    pub fn failing(self) -> Self {
        self.fail_calls.store(true, Ordering::SeqCst);
        self
    }

    /// Completion notices received.
    pub fn completions(&self) -> Vec<CompletionNotice> {
        self.completed.read().unwrap().clone()
    }

    /// Failure notices received.
    pub fn failures(&self) -> Vec<FailureNotice> {
        self.failed.read().unwrap().clone()
    }
}

#[async_trait]
impl LifecycleListener for RecordingListener {
    async fn on_completed(&self, notice: &CompletionNotice) -> Result<()> {
        self.completed.write().unwrap().push(notice.clone());
        if self.fail_calls.load(Ordering::SeqCst) {
            return Err(IntakeError::Storage("listener unavailable".into()));
        }
        Ok(())
    }

    async fn on_failed(&self, notice: &FailureNotice) -> Result<()> {
        self.failed.write().unwrap().push(notice.clone());
        if self.fail_calls.load(Ordering::SeqCst) {
            return Err(IntakeError::Storage("listener unavailable".into()));
        }
        Ok(())
    }
}

/// A realistic canonical section map.
pub fn sample_sections() -> CanonicalSections {
    CanonicalSections::new()
        .set_lines(
            JdSection::Responsibilities,
            [
                "design and operate the JD intake pipeline",
                "own summarization quality end to end",
            ],
        )
        .set_lines(
            JdSection::Requirements,
            ["3+ years of backend experience", "production Rust or Kotlin"],
        )
        .set_lines(JdSection::Preferred, ["experience with PostgreSQL"])
        .set_lines(JdSection::Etc, ["hybrid work, Seoul office"])
}

/// A well-formed LLM summary.
pub fn sample_llm_summary() -> LlmSummary {
    LlmSummary {
        career_type: "EXPERIENCED".into(),
        career_years: Some("3+".into()),
        summary: "Backend engineer owning the JD intake pipeline.".into(),
        responsibilities: vec!["design and operate the JD intake pipeline".into()],
        required_qualifications: vec!["3+ years of backend experience".into()],
        preferred_qualifications: vec!["experience with PostgreSQL".into()],
        tech_stack: vec!["rust".into(), "postgresql".into()],
        recruitment_process: vec!["screen".into(), "interview".into(), "offer".into()],
    }
}
