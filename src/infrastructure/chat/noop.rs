use crate::domain::error::DomainError;
use crate::domain::ports::chat_port::{ChatMessage, ChatModel, CompletionOptions};

/// Used when no chat model is configured. Every completion fails.
pub struct NoopChat;

#[async_trait::async_trait]
impl ChatModel for NoopChat {
    async fn complete(&self, _messages: &[ChatMessage], _options: CompletionOptions) -> Result<String, DomainError> {
        Err(DomainError::Completion("no chat model configured".into()))
    }
}
