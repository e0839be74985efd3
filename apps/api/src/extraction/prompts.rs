// Prompt construction for the three extraction tasks.
// Builders are pure: identical tasks always produce identical prompt pairs.

use crate::extraction::error::ExtractionError;
use crate::extraction::schema::{StructuredRfp, VendorProposal};
use crate::extraction::task::ExtractionTask;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, NULL_WHEN_MISSING};

pub const RFP_EXTRACTION_SYSTEM: &str = "\
You are an AI assistant that converts natural language procurement requests into \
structured RFP (Request for Proposal) data.

Extract the following fields from the user's description:
- title: A short, descriptive title for the RFP
- items: Array of objects {\"name\": string, \"quantity\": number | null} for every item or service requested
- budget: The budget amount (keep the original currency format)
- deadline: Delivery deadline or timeframe
- requirements: Array of specific requirements (specs, warranty, terms, etc.)
- payment_terms: Payment terms if mentioned
- additional_notes: Any other relevant information";

/// Replace `{description}` before sending.
pub const RFP_EXTRACTION_PROMPT: &str =
    "Convert this procurement request into structured JSON:\n\n\"{description}\"";

pub const PROPOSAL_EXTRACTION_SYSTEM: &str = "\
You are an AI assistant that extracts structured information from vendor proposal responses.

Extract the following fields from the vendor's response:
- vendor_name: Vendor or company name if mentioned
- pricing: Price information (per unit and/or total)
- delivery_time: Delivery timeframe or date
- warranty: Warranty terms
- payment_terms: Payment terms if mentioned
- technical_specs: Any technical specifications mentioned
- additional_terms: Any other important terms or conditions
- confidence_score: Your confidence in the extraction, a number from 0 to 100";

/// Replace `{response_text}` before sending.
pub const PROPOSAL_EXTRACTION_PROMPT: &str =
    "Extract structured data from this vendor response:\n\n\"{response_text}\"";

pub const COMPARISON_SYSTEM: &str = r#"You are an AI procurement analyst. Compare the given vendor proposals against the RFP and provide a comprehensive analysis.

Respond with a JSON object in exactly this format:
{
  "summary": "Brief overview of all proposals",
  "comparison": {
    "best_price": "Which vendor offers best pricing",
    "fastest_delivery": "Which vendor has fastest delivery",
    "best_warranty": "Which vendor has best warranty terms",
    "best_overall_value": "Which vendor offers best overall value"
  },
  "vendor_rankings": [
    {
      "vendor": "vendor name",
      "score": 0-100,
      "pros": ["list of advantages"],
      "cons": ["list of disadvantages"]
    }
  ],
  "recommendation": "Which vendor to choose and why (2-3 sentences)",
  "key_considerations": ["Important factors to consider before final decision"]
}"#;

/// A ready-to-send system/user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Builds the prompt pair for `task`, rejecting tasks with no usable input.
pub fn build(task: &ExtractionTask<'_>) -> Result<PromptPair, ExtractionError> {
    match *task {
        ExtractionTask::Rfp { description } => {
            require_text("description", description)?;
            Ok(PromptPair {
                system: extraction_system(RFP_EXTRACTION_SYSTEM),
                user: RFP_EXTRACTION_PROMPT.replace("{description}", description.trim()),
            })
        }
        ExtractionTask::Proposal { response_text } => {
            require_text("response_text", response_text)?;
            Ok(PromptPair {
                system: extraction_system(PROPOSAL_EXTRACTION_SYSTEM),
                user: PROPOSAL_EXTRACTION_PROMPT.replace("{response_text}", response_text.trim()),
            })
        }
        ExtractionTask::Comparison { rfp, proposals } => build_comparison(rfp, proposals),
    }
}

fn extraction_system(fields: &str) -> String {
    format!("{fields}\n\n{NULL_WHEN_MISSING}\n{JSON_ONLY_INSTRUCTION}")
}

fn require_text(field: &str, value: &str) -> Result<(), ExtractionError> {
    if value.trim().is_empty() {
        return Err(ExtractionError::InvalidTask(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn build_comparison(
    rfp: &StructuredRfp,
    proposals: &[VendorProposal],
) -> Result<PromptPair, ExtractionError> {
    if proposals.is_empty() {
        return Err(ExtractionError::InvalidTask(
            "comparison requires at least one proposal".to_string(),
        ));
    }
    if let Some(i) = proposals
        .iter()
        .position(|p| p.vendor_name.trim().is_empty())
    {
        return Err(ExtractionError::InvalidTask(format!(
            "proposal {} has no vendor name",
            i + 1
        )));
    }

    let system = format!(
        "{COMPARISON_SYSTEM}\n\n\
        vendor_rankings MUST contain exactly {count} entries, one per proposal, \
        each with \"vendor\" set to the vendor name exactly as given.\n\
        {JSON_ONLY_INSTRUCTION}",
        count = proposals.len()
    );

    let rfp_json = to_json(rfp)?;
    let proposals_text = proposals
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let vendor = match p.vendor_company.as_deref().map(str::trim) {
                Some(company) if !company.is_empty() => format!("{}, {}", p.vendor_name, company),
                _ => p.vendor_name.clone(),
            };
            Ok(format!(
                "Proposal {} ({}):\n{}",
                i + 1,
                vendor,
                to_json(&p.parsed_data)?
            ))
        })
        .collect::<Result<Vec<_>, ExtractionError>>()?
        .join("\n\n");

    let user = format!(
        "RFP Requirements:\n{rfp_json}\n\nVendor Proposals:\n{proposals_text}\n\n\
        Provide a detailed comparison and recommendation."
    );

    Ok(PromptPair { system, user })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ExtractionError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ExtractionError::InvalidTask(format!("input is not serializable: {e}")))
}
