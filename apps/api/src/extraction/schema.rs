//! Structured record shapes produced by the extraction pipeline.
//!
//! Every recognized key is always serialized, with `null` or `[]` standing in
//! for information the source text did not state.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Title used when the model could not name the RFP.
pub const UNTITLED_RFP: &str = "Untitled RFP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordShape {
    Rfp,
    Proposal,
    Comparison,
}

impl RecordShape {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordShape::Rfp => "rfp",
            RecordShape::Proposal => "proposal",
            RecordShape::Comparison => "comparison",
        }
    }
}

impl fmt::Display for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRfp {
    pub title: String,
    pub items: Vec<RfpItem>,
    pub budget: Option<String>,
    pub deadline: Option<String>,
    pub requirements: Vec<String>,
    pub payment_terms: Option<String>,
    pub additional_notes: Option<String>,
}

/// One requested line item. Quantity keeps the model's numeric form (20, 2.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfpItem {
    pub name: Option<String>,
    pub quantity: Option<Number>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredProposal {
    pub vendor_name: Option<String>,
    pub pricing: Option<String>,
    pub delivery_time: Option<String>,
    pub warranty: Option<String>,
    pub payment_terms: Option<String>,
    pub technical_specs: Option<String>,
    pub additional_terms: Option<String>,
    /// The model's own certainty about the extraction, 0 to 100.
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub summary: Option<String>,
    pub comparison: ComparisonHighlights,
    /// Order is the model's; only length and structure are checked.
    pub vendor_rankings: Vec<VendorRanking>,
    pub recommendation: Option<String>,
    pub key_considerations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonHighlights {
    pub best_price: Option<String>,
    pub fastest_delivery: Option<String>,
    pub best_warranty: Option<String>,
    pub best_overall_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRanking {
    pub vendor: String,
    pub score: Option<f64>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// A parsed proposal paired with the vendor that sent it, as fed to comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorProposal {
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_company: Option<String>,
    pub parsed_data: StructuredProposal,
}
