use std::fmt;

use crate::extraction::schema::{RecordShape, StructuredRfp, VendorProposal};

/// One request to turn input into a structured record. Borrows its inputs and
/// lives only for the duration of a single pipeline run.
#[derive(Debug, Clone, Copy)]
pub enum ExtractionTask<'a> {
    Rfp {
        description: &'a str,
    },
    Proposal {
        response_text: &'a str,
    },
    Comparison {
        rfp: &'a StructuredRfp,
        proposals: &'a [VendorProposal],
    },
}

impl ExtractionTask<'_> {
    pub fn shape(&self) -> RecordShape {
        match self {
            ExtractionTask::Rfp { .. } => RecordShape::Rfp,
            ExtractionTask::Proposal { .. } => RecordShape::Proposal,
            ExtractionTask::Comparison { .. } => RecordShape::Comparison,
        }
    }
}

impl fmt::Display for ExtractionTask<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionTask::Comparison { proposals, .. } => {
                write!(f, "comparison({} proposals)", proposals.len())
            }
            other => write!(f, "{}", other.shape()),
        }
    }
}
