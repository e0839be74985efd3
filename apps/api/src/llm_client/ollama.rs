//! Ollama adapter for the `CompletionClient` contract.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::llm_client::{compose_prompt, CompletionClient, LlmError};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Talks to a local or remote Ollama server over its REST API.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    config: LlmConfig,
}

impl OllamaClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.config.timeout)
        } else {
            LlmError::Http(e)
        }
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model: &self.config.model,
            prompt: compose_prompt(system, prompt),
            stream: false,
            options: GenerateOptions {
                temperature: self.config.sampling.temperature,
                top_p: self.config.sampling.top_p,
            },
        };

        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OllamaError>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            warn!("Ollama returned {status}: {message}");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Decode(e.to_string()))?;

        debug!(
            "Ollama generation succeeded: model={}, chars={}",
            self.config.model,
            generated.response.len()
        );

        Ok(generated.response)
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
