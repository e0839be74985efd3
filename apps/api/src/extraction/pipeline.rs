//! Extraction pipeline: one generation call per run, no retries.
//!
//! Flow: build prompts → await the model → sanitize → parse → validate.
//! A run either returns a fully normalized record or fails with the error of
//! the stage that stopped it. Dropping the future cancels the outstanding call.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::extraction::error::{ErrorKind, ExtractionError};
use crate::extraction::json_recovery::extract_json;
use crate::extraction::normalize::{normalize_proposal, normalize_rfp};
use crate::extraction::prompts;
use crate::extraction::schema::{StructuredProposal, StructuredRfp};
use crate::extraction::task::ExtractionTask;
use crate::llm_client::CompletionClient;

/// Raw model text longer than this is cut in debug logs.
const LOG_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Building,
    AwaitingResponse,
    Sanitizing,
    Parsing,
    Validating,
    Done,
    Failed(ErrorKind),
}

impl PipelineStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed(_))
    }
}

/// Tracks the stage of a single run and logs each transition.
#[derive(Debug)]
pub struct StageTracker {
    stage: PipelineStage,
    history: Vec<PipelineStage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            stage: PipelineStage::Building,
            history: vec![PipelineStage::Building],
        }
    }

    /// Moves to `next`. Terminal stages are final; later calls are ignored.
    pub fn advance(&mut self, next: PipelineStage) {
        if self.stage.is_terminal() {
            return;
        }
        debug!("Pipeline stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
        self.history.push(next);
    }

    /// Records the failure and hands the error back for propagation.
    pub fn fail(&mut self, error: ExtractionError) -> ExtractionError {
        warn!(
            "Pipeline failed during {:?}: {} ({:?})",
            self.stage,
            error,
            error.kind()
        );
        self.advance(PipelineStage::Failed(error.kind()));
        error
    }
}

/// Runs extraction tasks against a generation service with a per-call deadline.
#[derive(Clone)]
pub struct Extractor {
    client: Arc<dyn CompletionClient>,
    timeout: Duration,
}

impl Extractor {
    pub fn new(client: Arc<dyn CompletionClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Free-text procurement request → `StructuredRfp`.
    pub async fn extract_rfp(&self, description: &str) -> Result<StructuredRfp, ExtractionError> {
        self.run(ExtractionTask::Rfp { description }, normalize_rfp)
            .await
    }

    /// Free-text vendor response → `StructuredProposal`.
    pub async fn extract_proposal(
        &self,
        response_text: &str,
    ) -> Result<StructuredProposal, ExtractionError> {
        self.run(ExtractionTask::Proposal { response_text }, normalize_proposal)
            .await
    }

    /// Runs one task end to end, validating the parsed payload with `validate`.
    pub async fn run<T>(
        &self,
        task: ExtractionTask<'_>,
        validate: impl FnOnce(&Value) -> Result<T, ExtractionError>,
    ) -> Result<T, ExtractionError> {
        let span = info_span!("extraction", request_id = %Uuid::new_v4(), task = %task);
        self.run_stages(task, validate).instrument(span).await
    }

    async fn run_stages<T>(
        &self,
        task: ExtractionTask<'_>,
        validate: impl FnOnce(&Value) -> Result<T, ExtractionError>,
    ) -> Result<T, ExtractionError> {
        let mut tracker = StageTracker::new();

        let prompt = prompts::build(&task).map_err(|e| tracker.fail(e))?;

        tracker.advance(PipelineStage::AwaitingResponse);
        let raw = match tokio::time::timeout(
            self.timeout,
            self.client.complete(&prompt.system, &prompt.user),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(tracker.fail(e.into())),
            Err(_elapsed) => return Err(tracker.fail(ExtractionError::ModelTimeout(self.timeout))),
        };
        debug!("Model response: {}", preview(&raw));

        tracker.advance(PipelineStage::Sanitizing);
        tracker.advance(PipelineStage::Parsing);
        let value = extract_json(&raw).map_err(|e| tracker.fail(e))?;

        tracker.advance(PipelineStage::Validating);
        let record = validate(&value).map_err(|e| tracker.fail(e.with_raw(&raw)))?;

        tracker.advance(PipelineStage::Done);
        debug!("Pipeline finished: {:?}", tracker.history);
        Ok(record)
    }
}

fn preview(raw: &str) -> String {
    if raw.chars().count() <= LOG_PREVIEW_CHARS {
        raw.to_string()
    } else {
        let cut: String = raw.chars().take(LOG_PREVIEW_CHARS).collect();
        format!("{cut}…")
    }
}
