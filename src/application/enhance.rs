use crate::application::chat_tasks::ChatTasks;
use crate::application::process_task::{ProcessTaskUseCase, TaskPart};
use crate::domain::error::DomainError;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enhancement {
    pub prompt: String,
    /// The retrieved context the prompt was refined with, if any.
    pub context: Option<String>,
}

pub struct EnhanceUseCase {
    process: Arc<ProcessTaskUseCase>,
    chat_tasks: Arc<ChatTasks>,
}

impl EnhanceUseCase {
    pub fn new(process: Arc<ProcessTaskUseCase>, chat_tasks: Arc<ChatTasks>) -> Self {
        Self { process, chat_tasks }
    }

    /// Retrieves context for `raw_prompt` and asks the chat model to fold it in.
    /// Without context the raw prompt comes back unchanged.
    pub async fn execute(&self, raw_prompt: &str) -> Result<Enhancement, DomainError> {
        if raw_prompt.trim().is_empty() {
            return Err(DomainError::InvalidInput("prompt is empty".into()));
        }

        let context = match self.process.rag_context(raw_prompt).await {
            TaskPart::Ready { text } => text,
            TaskPart::Empty => {
                tracing::info!("No relevant context found, returning the original prompt");
                return Ok(Enhancement {
                    prompt: raw_prompt.to_string(),
                    context: None,
                });
            }
            TaskPart::Failed { error } => {
                tracing::warn!(%error, "Context retrieval failed, returning the original prompt");
                return Ok(Enhancement {
                    prompt: raw_prompt.to_string(),
                    context: None,
                });
            }
        };

        let prompt = self.chat_tasks.refine_prompt(raw_prompt, &context).await?;
        Ok(Enhancement {
            prompt,
            context: Some(context),
        })
    }
}
