//! Axum route handlers for the extraction API.
//!
//! Handlers are the callers of the pipeline: they own the retry policy for
//! transient service failures. Nothing here persists records.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extraction::comparison::compare_proposals;
use crate::extraction::error::ExtractionError;
use crate::extraction::schema::{
    ComparisonReport, StructuredProposal, StructuredRfp, VendorProposal,
};
use crate::llm_client::retry::{with_backoff, BASE_DELAY};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractRfpRequest {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ExtractProposalRequest {
    pub response_text: String,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub rfp: StructuredRfp,
    pub proposals: Vec<VendorProposal>,
}

#[derive(Debug, Serialize)]
pub struct ComparisonResponse {
    pub rfp_title: String,
    pub proposals_count: usize,
    pub proposals: Vec<VendorProposal>,
    pub ai_analysis: ComparisonReport,
    pub generated_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/rfps/extract
///
/// Converts a natural-language procurement request into a structured RFP.
pub async fn handle_extract_rfp(
    State(state): State<AppState>,
    Json(request): Json<ExtractRfpRequest>,
) -> Result<Json<StructuredRfp>, AppError> {
    if request.description.trim().is_empty() {
        return Err(AppError::Validation("description cannot be empty".to_string()));
    }

    let extractor = &state.extractor;
    let description = request.description.as_str();
    let rfp = with_backoff(
        state.config.llm_max_retries,
        BASE_DELAY,
        ExtractionError::is_retryable,
        move || extractor.extract_rfp(description),
    )
    .await?;

    Ok(Json(rfp))
}

/// POST /api/v1/proposals/extract
///
/// Extracts structured terms from a vendor's free-text response.
pub async fn handle_extract_proposal(
    State(state): State<AppState>,
    Json(request): Json<ExtractProposalRequest>,
) -> Result<Json<StructuredProposal>, AppError> {
    if request.response_text.trim().is_empty() {
        return Err(AppError::Validation("response_text cannot be empty".to_string()));
    }

    let extractor = &state.extractor;
    let response_text = request.response_text.as_str();
    let proposal = with_backoff(
        state.config.llm_max_retries,
        BASE_DELAY,
        ExtractionError::is_retryable,
        move || extractor.extract_proposal(response_text),
    )
    .await?;

    Ok(Json(proposal))
}

/// POST /api/v1/proposals/compare
///
/// Ranks the supplied proposals against the RFP. At least one proposal is required.
pub async fn handle_compare(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<ComparisonResponse>, AppError> {
    let extractor = &state.extractor;
    let rfp = &request.rfp;
    let proposals = request.proposals.as_slice();
    let report = with_backoff(
        state.config.llm_max_retries,
        BASE_DELAY,
        ExtractionError::is_retryable,
        move || compare_proposals(extractor, rfp, proposals),
    )
    .await?;

    Ok(Json(ComparisonResponse {
        rfp_title: request.rfp.title.clone(),
        proposals_count: request.proposals.len(),
        ai_analysis: report,
        proposals: request.proposals,
        generated_at: Utc::now(),
    }))
}
