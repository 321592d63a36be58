use crate::application::chat_tasks::ChatTasks;
use crate::application::retrieve::{join_context, RetrieveUseCase};
use serde::Serialize;
use std::sync::Arc;

/// Result of one half of `process_task`. A failure is kept apart from "nothing found".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskPart {
    Ready { text: String },
    Empty,
    Failed { error: String },
}

impl TaskPart {
    pub fn text(&self) -> Option<&str> {
        match self {
            TaskPart::Ready { text } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskContext {
    pub rag_context: TaskPart,
    pub summary: TaskPart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Documents retrieved per task.
    pub k: usize,
    /// Ask the chat model whether the task is technical before retrieving.
    pub relevance_gate: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            k: 2,
            relevance_gate: true,
        }
    }
}

/// Runs retrieval and history summarization side by side and merges the two.
pub struct ProcessTaskUseCase {
    retrieve: Arc<RetrieveUseCase>,
    chat_tasks: Arc<ChatTasks>,
    options: ProcessOptions,
}

impl ProcessTaskUseCase {
    pub fn new(retrieve: Arc<RetrieveUseCase>, chat_tasks: Arc<ChatTasks>, options: ProcessOptions) -> Self {
        Self {
            retrieve,
            chat_tasks,
            options,
        }
    }

    pub async fn execute(&self, task_description: &str, history: &[String]) -> TaskContext {
        let (rag_context, summary) = tokio::join!(
            self.rag_context(task_description),
            self.summary(history)
        );
        TaskContext { rag_context, summary }
    }

    pub async fn rag_context(&self, task_description: &str) -> TaskPart {
        if self.options.relevance_gate {
            match self.chat_tasks.is_task_relevant(task_description).await {
                Ok(true) => {}
                Ok(false) => return TaskPart::Empty,
                Err(e) => {
                    tracing::warn!(error = %e, "Relevance check failed");
                    return TaskPart::Failed { error: e.to_string() };
                }
            }
        }

        match self.retrieve.try_query(task_description, self.options.k).await {
            Ok(results) => match join_context(&results) {
                Some(text) => TaskPart::Ready { text },
                None => TaskPart::Empty,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Retrieval failed");
                TaskPart::Failed { error: e.to_string() }
            }
        }
    }

    async fn summary(&self, history: &[String]) -> TaskPart {
        if history.is_empty() {
            return TaskPart::Empty;
        }
        match self.chat_tasks.summarize_history(history).await {
            Ok(text) => TaskPart::Ready { text },
            Err(e) => {
                tracing::warn!(error = %e, "History summary failed");
                TaskPart::Failed { error: e.to_string() }
            }
        }
    }
}
