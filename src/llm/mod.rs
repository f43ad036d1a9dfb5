//! Chat-completion access for answer generation
//!
//! [`ChatModel`] is the seam the answer generator talks to; [`LlmService`] is
//! the HTTP implementation for Gemini, OpenAI-compatible servers and Ollama.

pub mod prompts;
pub mod service;

use async_trait::async_trait;
pub use prompts::PromptTemplate;
use serde::Deserialize;
use serde::Serialize;
pub use service::LlmService;

use crate::errors::Result;

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message sent to a chat model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters for one completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1024,
        }
    }
}

/// A hosted language model that completes a conversation
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], params: GenerationParams)
        -> Result<String>;
}
