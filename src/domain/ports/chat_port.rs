use crate::domain::error::DomainError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: Option<u32>,
    pub temperature: f32,
}

impl CompletionOptions {
    pub fn new(max_tokens: Option<u32>, temperature: f32) -> Self {
        Self { max_tokens, temperature }
    }
}

/// Chat completion model used for relevance checks, summaries and prompt refinement.
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the trimmed content of the first choice.
    async fn complete(&self, messages: &[ChatMessage], options: CompletionOptions) -> Result<String, DomainError>;
}
