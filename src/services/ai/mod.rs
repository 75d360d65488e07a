pub mod groq;
pub mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat-completion backend. Implementations ask the model for a JSON reply
/// and return its raw text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete_json(&self, messages: &[ChatMessage]) -> anyhow::Result<String>;
}
