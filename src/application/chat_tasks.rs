use crate::domain::error::DomainError;
use crate::domain::ports::chat_port::{ChatMessage, ChatModel, CompletionOptions};
use std::sync::Arc;

const REFINE_SYSTEM_PROMPT: &str = "You are an expert prompt engineering assistant. Your task is to analyze an original user prompt and a set of retrieved documents (context), and then create a new, enhanced prompt. \n\n\
Follow these instructions carefully:\n\
1.  Read the 'Original User Prompt' to understand the user's core question or goal.\n\
2.  Analyze the 'Retrieved Context'. Identify ONLY the pieces of information that are directly relevant and useful for answering the original prompt.\n\
3.  IGNORE any context that is irrelevant, redundant, or confusing.\n\
4.  Synthesize the useful information from the context with the original prompt.\n\
5.  Your final output MUST be ONLY the new, enhanced prompt, ready to be sent to another powerful AI for the final answer. Do not answer the prompt yourself. Do not add any conversational fluff or explanations like 'Here is the enhanced prompt:'. Just output the prompt itself.";

/// The three chat-model calls around retrieval: relevance gate, history summary and prompt refinement.
pub struct ChatTasks {
    chat: Arc<dyn ChatModel>,
}

impl ChatTasks {
    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self { chat }
    }

    pub async fn is_task_relevant(&self, task: &str) -> Result<bool, DomainError> {
        let prompt = format!(
            "Is the following task related to programming, software development, or technology? Answer with only 'yes' or 'no'.\n\nTask: '{task}'"
        );
        let answer = self
            .chat
            .complete(&[ChatMessage::user(prompt)], CompletionOptions::new(Some(5), 0.0))
            .await?
            .to_lowercase();
        tracing::debug!(%answer, "Relevance check");
        Ok(answer.contains("yes"))
    }

    pub async fn summarize_history(&self, history: &[String]) -> Result<String, DomainError> {
        let prompt = format!(
            "Please provide a concise summary of the following conversation:\n\n{}",
            history.join("\n")
        );
        self.chat
            .complete(&[ChatMessage::user(prompt)], CompletionOptions::new(Some(150), 0.2))
            .await
    }

    pub async fn refine_prompt(&self, raw_prompt: &str, context: &str) -> Result<String, DomainError> {
        let user_content = format!(
            "**Original User Prompt:**\n{raw_prompt}\n\n**Retrieved Context:**\n---\n{context}\n---"
        );
        self.chat
            .complete(
                &[ChatMessage::system(REFINE_SYSTEM_PROMPT), ChatMessage::user(user_content)],
                CompletionOptions::new(None, 0.1),
            )
            .await
    }
}
