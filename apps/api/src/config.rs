use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub llm_timeout_secs: u64,
    /// Retries applied by the HTTP handlers around a failed generation call.
    pub llm_max_retries: u32,
    pub port: u16,
    pub rust_log: String,
}

/// Immutable settings for the generation service, handed to the client and
/// the extractor at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub sampling: SamplingOptions,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = SamplingOptions::default();
        let config = Config {
            ollama_base_url: optional_env("OLLAMA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string()),
            ollama_model: optional_env("OLLAMA_MODEL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            temperature: parse_env("LLM_TEMPERATURE", defaults.temperature)?,
            top_p: parse_env("LLM_TOP_P", defaults.top_p)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            llm_max_retries: parse_env("LLM_MAX_RETRIES", 2)?,
            port: parse_env("PORT", 3001)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            bail!("LLM_TEMPERATURE must be between 0.0 and 2.0");
        }
        if !self.top_p.is_finite() || self.top_p <= 0.0 || self.top_p > 1.0 {
            bail!("LLM_TOP_P must be in (0.0, 1.0]");
        }
        if self.llm_timeout_secs == 0 {
            bail!("LLM_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }

    pub fn llm(&self) -> LlmConfig {
        LlmConfig {
            base_url: self.ollama_base_url.trim_end_matches('/').to_string(),
            model: self.ollama_model.clone(),
            sampling: SamplingOptions {
                temperature: self.temperature,
                top_p: self.top_p,
            },
            timeout: Duration::from_secs(self.llm_timeout_secs),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
