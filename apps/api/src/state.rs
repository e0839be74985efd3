use std::sync::Arc;

use crate::config::Config;
use crate::extraction::pipeline::Extractor;
use crate::llm_client::CompletionClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every pipeline run is independent.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Extractor,
    /// Same client the extractor uses, kept for health reporting.
    pub llm: Arc<dyn CompletionClient>,
    pub config: Config,
}

impl AppState {
    pub fn new(llm: Arc<dyn CompletionClient>, config: Config) -> Self {
        let extractor = Extractor::new(llm.clone(), config.llm().timeout);
        Self {
            extractor,
            llm,
            config,
        }
    }
}
