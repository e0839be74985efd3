// Extraction pipeline: prompt building, JSON recovery, normalization, comparison.
// All model calls go through llm_client; nothing here speaks HTTP to the model.

pub mod comparison;
pub mod error;
pub mod handlers;
pub mod json_recovery;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod schema;
pub mod task;
