//! Scripted `CompletionClient` for tests.
//!
//! Replies are consumed in order; every call is recorded so tests can assert
//! on the exact prompts the pipeline produced.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::llm_client::{CompletionClient, LlmError};

#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Delayed(Duration, String),
    Unavailable(String),
    Status(u16, String),
    Timeout(Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub system: String,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct MockCompletionClient {
    model: String,
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    models: Result<Vec<String>, String>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            model: "llama3.1".to_string(),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            models: Ok(Vec::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_reply(MockReply::Text(text.into()))
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = Ok(models);
        self
    }

    pub fn with_models_unavailable(mut self, message: impl Into<String>) -> Self {
        self.models = Err(message.into());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
        });

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(MockReply::Unavailable(message)) => Err(LlmError::Api {
                status: 503,
                message,
            }),
            Some(MockReply::Status(status, message)) => Err(LlmError::Api { status, message }),
            Some(MockReply::Timeout(after)) => Err(LlmError::Timeout(after)),
            None => Err(LlmError::Api {
                status: 500,
                message: "mock has no scripted reply".to_string(),
            }),
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        self.models.clone().map_err(|message| LlmError::Api {
            status: 503,
            message,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
