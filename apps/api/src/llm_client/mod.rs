//! LLM Client: the boundary between the extraction pipeline and the external
//! text-generation service.
//!
//! ARCHITECTURAL RULE: No other module may talk to the generation service directly.
//! Everything goes through a `CompletionClient`: `OllamaClient` in production,
//! a scripted double in tests.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

#[cfg(test)]
pub mod mock;
pub mod ollama;
pub mod prompts;
pub mod retry;

pub use ollama::OllamaClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Generation service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl LlmError {
    pub fn is_timeout(&self) -> bool {
        match self {
            LlmError::Timeout(_) => true,
            LlmError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// The generation service contract consumed by the pipeline.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Runs one non-streaming generation and returns the raw response text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Lists the model names the service currently has available.
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;

    /// The configured model identifier, e.g. `llama3.1` or `llama3.1:8b`.
    fn model(&self) -> &str;
}

/// Joins system and user prompts the way the generation endpoint expects them:
/// a single text body with a blank line between the two parts.
pub fn compose_prompt(system: &str, prompt: &str) -> String {
    if system.trim().is_empty() {
        prompt.to_string()
    } else {
        format!("{system}\n\n{prompt}")
    }
}

/// Health view of the generation service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStatus {
    pub running: bool,
    pub model_available: bool,
    pub model: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Checks whether the service is reachable and the configured model is pulled.
///
/// The configured model's base name (text before any `:` tag) is matched by
/// substring against each listed model, so `llama3.1` matches `llama3.1:latest`.
pub async fn model_status(client: &dyn CompletionClient) -> ModelStatus {
    let model = client.model().to_string();
    match client.list_models().await {
        Ok(models) => ModelStatus {
            running: true,
            model_available: model_is_listed(&model, &models),
            model,
            models,
            error: None,
        },
        Err(e) => {
            warn!("Generation service health check failed: {e}");
            ModelStatus {
                running: false,
                model_available: false,
                model,
                models: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

fn model_is_listed(model: &str, available: &[String]) -> bool {
    let base = model.split(':').next().unwrap_or(model);
    available.iter().any(|name| name.contains(base))
}
