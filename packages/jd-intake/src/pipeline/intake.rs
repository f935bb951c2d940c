//! Pipeline orchestration - intake decision, summarization, completion.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::consumer::{consume_once, Consumption};
use crate::dedup::{DuplicateDecision, DuplicateDetector};
use crate::error::{IntakeError, Result};
use crate::pipeline::IntakeConfig;
use crate::simhash::calculator::SimHashCalculator;
use crate::traits::{
    listener::{CompletionNotice, FailureNotice, LifecycleListener},
    store::IntakeStore,
    summarizer::Summarizer,
};
use crate::types::{
    events::{SummaryCompleted, SummaryFailed},
    processing::JdSummaryProcessing,
    section::CanonicalSections,
    snapshot::{JobSnapshot, RecruitmentPeriod, SourceType},
    summary::{JobSummary, LlmSummary, SummarizeRequest},
};

/// One intake request as received from the preprocessing tier.
#[derive(Debug, Clone)]
pub struct IntakeRequest {
    /// Externally issued, globally unique; keys the processing record
    pub request_id: String,
    pub brand_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub brand_name: String,
    pub position_name: String,
    pub position_candidates: Vec<String>,
    pub category_candidates: Vec<String>,
    pub source_type: SourceType,
    pub source_url: Option<String>,
    pub raw_text: String,
    pub sections: CanonicalSections,
    pub recruitment: RecruitmentPeriod,
}

impl IntakeRequest {
    /// Create a minimal request.
    pub fn new(
        request_id: impl Into<String>,
        source_type: SourceType,
        raw_text: impl Into<String>,
        sections: CanonicalSections,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            brand_id: None,
            position_id: None,
            brand_name: String::new(),
            position_name: String::new(),
            position_candidates: Vec::new(),
            category_candidates: Vec::new(),
            source_type,
            source_url: None,
            raw_text: raw_text.into(),
            sections,
            recruitment: RecruitmentPeriod::default(),
        }
    }

    /// Scope to a brand.
    pub fn with_brand(mut self, brand_id: Uuid, brand_name: impl Into<String>) -> Self {
        self.brand_id = Some(brand_id);
        self.brand_name = brand_name.into();
        self
    }

    /// Scope to a position.
    pub fn with_position(mut self, position_id: Uuid, position_name: impl Into<String>) -> Self {
        self.position_id = Some(position_id);
        self.position_name = position_name.into();
        self
    }

    /// Record the scraped source URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Candidate names the LLM may normalize against.
    pub fn with_candidates(
        mut self,
        positions: Vec<String>,
        categories: Vec<String>,
    ) -> Self {
        self.position_candidates = positions;
        self.category_candidates = categories;
        self
    }

    /// The part of the request the summarization stage needs.
    pub fn summarize_command(&self) -> SummarizeCommand {
        SummarizeCommand {
            request_id: self.request_id.clone(),
            brand_name: self.brand_name.clone(),
            position_name: self.position_name.clone(),
            position_candidates: self.position_candidates.clone(),
            category_candidates: self.category_candidates.clone(),
        }
    }
}

/// Input to the summarization stage. Everything else it needs (the section
/// map) lives on the snapshot bound at `mark_summarizing`.
#[derive(Debug, Clone)]
pub struct SummarizeCommand {
    pub request_id: String,
    pub brand_name: String,
    pub position_name: String,
    pub position_candidates: Vec<String>,
    pub category_candidates: Vec<String>,
}

/// Result of the intake decision.
#[derive(Debug, Clone)]
pub enum IntakeOutcome {
    /// A new snapshot was created and the request moved to SUMMARIZING
    Accepted { snapshot_id: Uuid },
    /// The content duplicates an existing snapshot; the request ended as
    /// DUPLICATE and no LLM work will happen
    Duplicate(DuplicateDecision),
}

/// The orchestration root.
///
/// Owns the duplicate decision, the per-request state machine, the
/// timeout-bounded LLM call, and the terminal transactions. Generic over the
/// store, the LLM port and the listener port.
pub struct IntakePipeline<S, A, L> {
    store: Arc<S>,
    summarizer: Arc<A>,
    listener: Arc<L>,
    config: IntakeConfig,
    calculator: SimHashCalculator,
    detector: DuplicateDetector,
}

impl<S, A, L> Clone for IntakePipeline<S, A, L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            summarizer: Arc::clone(&self.summarizer),
            listener: Arc::clone(&self.listener),
            config: self.config.clone(),
            calculator: self.calculator.clone(),
            detector: self.detector.clone(),
        }
    }
}

impl<S, A, L> IntakePipeline<S, A, L>
where
    S: IntakeStore,
    A: Summarizer,
    L: LifecycleListener,
{
    /// Create a pipeline over the given store and ports.
    pub fn new(store: Arc<S>, summarizer: Arc<A>, listener: Arc<L>, config: IntakeConfig) -> Self {
        let calculator = SimHashCalculator::new(config.section_weights);
        let detector =
            DuplicateDetector::new(config.near_duplicate_threshold, config.candidate_limit);
        Self {
            store,
            summarizer,
            listener,
            config,
            calculator,
            detector,
        }
    }

    /// Run the intake decision for one request.
    ///
    /// Creates the processing record, decides duplicate vs. new, persists the
    /// snapshot, and moves the request to SUMMARIZING. Does not invoke the
    /// LLM; follow up with [`spawn_summarize`](Self::spawn_summarize) or
    /// [`summarize_and_complete`](Self::summarize_and_complete).
    pub async fn intake(&self, request: &IntakeRequest) -> Result<IntakeOutcome> {
        validate(request)?;

        let processing = JdSummaryProcessing::start(&request.request_id);
        self.store.create_processing(&processing).await?;

        let snapshot = self.build_snapshot(request);

        let decision = self.detector.detect(self.store.as_ref(), &snapshot).await?;
        if let DuplicateDecision::Duplicate { reason, .. } = decision {
            self.record_duplicate(&request.request_id, reason.as_str())
                .await?;
            info!(
                request_id = %request.request_id,
                reason = reason.as_str(),
                "intake rejected as duplicate"
            );
            return Ok(IntakeOutcome::Duplicate(decision));
        }

        if let Err(err) = self.store.insert_snapshot(&snapshot).await {
            return match err {
                // Lost the insert race to a concurrent identical intake; the
                // unique constraint picked the winner for us.
                IntakeError::DuplicateContent { content_hash } => {
                    let existing = self
                        .store
                        .find_by_content_hash(&content_hash)
                        .await?
                        .ok_or_else(|| IntakeError::not_found("snapshot", &content_hash))?;
                    let existing_summary_id =
                        self.store.summary_id_for_snapshot(existing.id).await?;
                    let decision = DuplicateDecision::Duplicate {
                        reason: crate::dedup::DuplicateReason::Hash,
                        existing_snapshot_id: existing.id,
                        existing_summary_id,
                    };
                    self.record_duplicate(&request.request_id, "HASH").await?;
                    Ok(IntakeOutcome::Duplicate(decision))
                }
                other => Err(other),
            };
        }

        let mut processing = self.load_processing(&request.request_id).await?;
        processing.mark_summarizing(snapshot.id)?;
        self.store.update_processing(&processing).await?;

        info!(
            request_id = %request.request_id,
            snapshot_id = %snapshot.id,
            "intake accepted, summarizing"
        );
        Ok(IntakeOutcome::Accepted {
            snapshot_id: snapshot.id,
        })
    }

    /// Fire the summarization stage without blocking the caller.
    ///
    /// Errors inside the task end as FAILED transitions; anything that still
    /// escapes is logged.
    pub fn spawn_summarize(&self, command: SummarizeCommand) -> JoinHandle<()>
    where
        S: 'static,
        A: 'static,
        L: 'static,
    {
        let pipeline = self.clone();
        tokio::spawn(async move {
            if let Err(err) = pipeline.summarize_and_complete(&command).await {
                warn!(
                    request_id = %command.request_id,
                    error = %err,
                    "summarization task failed"
                );
            }
        })
    }

    /// Run the summarization stage to its terminal state.
    ///
    /// Calls the LLM under the configured timeout. On success the raw output
    /// is persisted through an independently committed unit of work before
    /// the completion transaction runs, so a crash in between never loses
    /// the LLM result. LLM failures end as FAILED transitions with explicit
    /// error codes, not as returned errors.
    pub async fn summarize_and_complete(&self, command: &SummarizeCommand) -> Result<()> {
        let mut processing = self.load_processing(&command.request_id).await?;
        let snapshot_id = processing
            .snapshot_id
            .ok_or_else(|| IntakeError::not_found("snapshot binding", &command.request_id))?;
        let snapshot = self
            .store
            .get_snapshot(snapshot_id)
            .await?
            .ok_or_else(|| IntakeError::not_found("snapshot", snapshot_id.to_string()))?;

        let llm_request = SummarizeRequest {
            brand_name: command.brand_name.clone(),
            position_name: command.position_name.clone(),
            position_candidates: command.position_candidates.clone(),
            category_candidates: command.category_candidates.clone(),
            sections: snapshot.sections,
        };

        let llm_result = match timeout(
            self.config.llm_timeout,
            self.summarizer.summarize(&llm_request),
        )
        .await
        {
            Err(_elapsed) => {
                return self
                    .fail(&command.request_id, &IntakeError::LlmTimeout)
                    .await;
            }
            Ok(Err(err)) => {
                return self.fail(&command.request_id, &err).await;
            }
            Ok(Ok(summary)) => summary,
        };

        let llm_json =
            serde_json::to_string(&llm_result).map_err(IntakeError::storage)?;
        processing.save_llm_result(llm_json, &command.brand_name, &command.position_name)?;
        // Independent commit: durable before anything downstream can fail.
        self.store.update_processing(&processing).await?;

        self.finalize(&command.request_id).await.map(|_| ())
    }

    /// Run the post-LLM step: parse the saved output, then commit summary +
    /// outbox event + COMPLETED atomically, then dispatch the post-commit
    /// listener. Safe to call again after a crash, which is exactly what the
    /// recovery pass does.
    pub async fn finalize(&self, request_id: &str) -> Result<Uuid> {
        let mut processing = self.load_processing(request_id).await?;
        let snapshot_id = processing
            .snapshot_id
            .ok_or_else(|| IntakeError::not_found("snapshot binding", request_id))?;
        let llm_json = processing
            .llm_result_json
            .clone()
            .ok_or_else(|| IntakeError::not_found("saved LLM result", request_id))?;

        let llm_result: LlmSummary = match serde_json::from_str(&llm_json) {
            Ok(parsed) => parsed,
            Err(err) => {
                // Deterministic for this input; retrying will not help.
                let parse_err = IntakeError::LlmParse(err);
                self.fail(request_id, &parse_err).await?;
                return Err(parse_err);
            }
        };

        let brand_name = processing.command_brand_name.clone().unwrap_or_default();
        let position_name = processing.command_position_name.clone().unwrap_or_default();
        let summary = JobSummary::from_llm(snapshot_id, &brand_name, &position_name, llm_result);

        processing.mark_completed(summary.id)?;
        let event = SummaryCompleted {
            request_id: request_id.to_string(),
            summary_id: summary.id,
            snapshot_id,
            brand_name: brand_name.clone(),
            position_name: position_name.clone(),
        }
        .into_outbox()?;

        self.store
            .commit_completion(&processing, &summary, &event)
            .await?;
        info!(request_id, summary_id = %summary.id, "processing completed");

        // Post-commit, best effort only.
        let notice = CompletionNotice {
            request_id: request_id.to_string(),
            summary_id: summary.id,
            snapshot_id,
            brand_name,
            position_name,
        };
        if let Err(err) = self.listener.on_completed(&notice).await {
            warn!(request_id, error = %err, "completion listener failed");
        }

        Ok(summary.id)
    }

    /// Record a terminal failure: FAILED transition + failure outbox event in
    /// one transaction, then the post-commit listener.
    pub async fn fail(&self, request_id: &str, cause: &IntakeError) -> Result<()> {
        let mut processing = self.load_processing(request_id).await?;
        let error_code = cause.error_code();
        let error_message = cause.to_string();
        processing.mark_failed(error_code, &error_message)?;

        let event = SummaryFailed {
            request_id: request_id.to_string(),
            error_code: error_code.to_string(),
            error_message: error_message.clone(),
            retryable: cause.retryable(),
        }
        .into_outbox()?;

        self.store.commit_failure(&processing, &event).await?;
        warn!(request_id, error_code, "processing failed");

        let notice = FailureNotice {
            request_id: request_id.to_string(),
            error_code: error_code.to_string(),
            error_message,
            retryable: cause.retryable(),
            brand_name: processing.command_brand_name.clone(),
            position_name: processing.command_position_name.clone(),
        };
        if let Err(err) = self.listener.on_failed(&notice).await {
            warn!(request_id, error = %err, "failure listener failed");
        }

        Ok(())
    }

    /// Consume one preprocessing-response message.
    ///
    /// Delivery is at-least-once and the event id equals the request id, so
    /// consumption goes through the idempotency ledger before any side
    /// effect. Redeliveries are skipped and should still be acknowledged.
    pub async fn handle_preprocessing_response(
        &self,
        request: &IntakeRequest,
        consumer_group: &str,
    ) -> Result<Consumption> {
        consume_once(
            self.store.as_ref(),
            &request.request_id,
            consumer_group,
            || async {
                if let IntakeOutcome::Accepted { .. } = self.intake(request).await? {
                    self.summarize_and_complete(&request.summarize_command())
                        .await?;
                }
                Ok(())
            },
        )
        .await
    }

    pub(crate) fn store(&self) -> &S {
        self.store.as_ref()
    }

    fn build_snapshot(&self, request: &IntakeRequest) -> JobSnapshot {
        let fingerprint = self.calculator.fingerprint(&request.sections);
        let mut snapshot = JobSnapshot::new(
            request.source_type,
            &request.raw_text,
            request.sections.clone(),
        )
        .with_fingerprint(fingerprint)
        .with_recruitment(request.recruitment);
        snapshot.brand_id = request.brand_id;
        snapshot.position_id = request.position_id;
        snapshot.source_url = request.source_url.clone();
        snapshot
    }

    async fn record_duplicate(&self, request_id: &str, reason: &str) -> Result<()> {
        let mut processing = self.load_processing(request_id).await?;
        processing.mark_duplicate(reason)?;
        self.store.update_processing(&processing).await
    }

    async fn load_processing(&self, request_id: &str) -> Result<JdSummaryProcessing> {
        self.store
            .get_processing(request_id)
            .await?
            .ok_or_else(|| IntakeError::not_found("processing", request_id))
    }
}

fn validate(request: &IntakeRequest) -> Result<()> {
    if request.request_id.trim().is_empty() {
        return Err(IntakeError::Validation {
            reason: "request_id must not be empty".into(),
        });
    }
    if request.raw_text.trim().is_empty() {
        return Err(IntakeError::Validation {
            reason: "raw_text must not be empty".into(),
        });
    }
    if request.sections.is_empty() {
        return Err(IntakeError::Validation {
            reason: "canonical sections must not be empty".into(),
        });
    }
    Ok(())
}
