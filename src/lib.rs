pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::add_document::AddDocumentUseCase;
use crate::application::chat_tasks::ChatTasks;
use crate::application::enhance::{EnhanceUseCase, Enhancement};
use crate::application::process_task::{ProcessOptions, ProcessTaskUseCase, TaskContext};
use crate::application::retrieve::RetrieveUseCase;
use crate::application::stats::{StatsUseCase, StoreStats};
use crate::config::{EmbeddingBackend, Settings};
use crate::domain::entities::document::{AddOutcome, DocumentMetadata, ScoredDocument};
use crate::domain::error::DomainError;
use crate::domain::ports::chat_port::ChatModel;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::ports::vector_store::VectorStore;
use crate::infrastructure::chat::noop::NoopChat;
use crate::infrastructure::chat::openai::OpenAiChat;
use crate::infrastructure::embeddings::noop::NoopProvider;
use crate::infrastructure::embeddings::normalized::NormalizingEmbedder;
use crate::infrastructure::embeddings::openai::OpenAiProvider;
use crate::infrastructure::filestore::vector_store::FileVectorStore;
use std::sync::Arc;

/// Default number of results for a plain similarity query.
pub const DEFAULT_K: usize = 5;

pub struct LocalMemory {
    add_document_uc: AddDocumentUseCase,
    retrieve_uc: Arc<RetrieveUseCase>,
    process_uc: Arc<ProcessTaskUseCase>,
    enhance_uc: EnhanceUseCase,
    stats_uc: StatsUseCase,
}

impl LocalMemory {
    pub async fn new(settings: &Settings) -> Result<Self, DomainError> {
        let timeout = settings.request_timeout();

        let embedder: Arc<dyn EmbeddingProvider> = match settings.embedding.backend()? {
            EmbeddingBackend::OpenAi => Arc::new(
                OpenAiProvider::new(
                    settings.embedding.api_key.clone(),
                    non_empty(&settings.embedding.model_name),
                    non_empty(&settings.embedding.base_url),
                )
                .with_timeout(timeout)?,
            ),
            EmbeddingBackend::None => {
                tracing::warn!("No embedding provider configured, retrieval is disabled");
                Arc::new(NoopProvider)
            }
        };

        let chat: Arc<dyn ChatModel> = if settings.chat_llm.is_complete() {
            Arc::new(
                OpenAiChat::new(
                    settings.chat_llm.api_key.clone(),
                    settings.chat_llm.model_name.clone(),
                    settings.chat_llm.base_url.clone(),
                )
                .with_timeout(timeout)?,
            )
        } else {
            tracing::warn!("Chat LLM configuration incomplete, relevance checks and summaries will fail");
            Arc::new(NoopChat)
        };

        let store = FileVectorStore::open(&settings.store.data_dir, settings.store.on_corrupt).await?;

        let options = ProcessOptions {
            k: settings.retrieval.k,
            relevance_gate: settings.retrieval.relevance_gate,
        };
        Ok(Self::with_providers(Arc::new(store), embedder, chat, options))
    }

    pub fn with_providers(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatModel>,
        options: ProcessOptions,
    ) -> Self {
        let model = embedder.model().to_string();
        let embedder = NormalizingEmbedder::new(embedder);
        let chat_tasks = Arc::new(ChatTasks::new(chat));

        let retrieve_uc = Arc::new(RetrieveUseCase::new(embedder.clone(), vector_store.clone()));
        let process_uc = Arc::new(ProcessTaskUseCase::new(retrieve_uc.clone(), chat_tasks.clone(), options));

        Self {
            add_document_uc: AddDocumentUseCase::new(embedder, vector_store.clone()),
            enhance_uc: EnhanceUseCase::new(process_uc.clone(), chat_tasks),
            stats_uc: StatsUseCase::new(vector_store, model),
            retrieve_uc,
            process_uc,
        }
    }

    pub async fn add_document(&self, document: &str, source: &str) -> Result<AddOutcome, DomainError> {
        self.add_document_uc
            .execute(document.to_string(), DocumentMetadata::new(source))
            .await
    }

    pub async fn add_document_with_metadata(
        &self,
        document: String,
        metadata: DocumentMetadata,
    ) -> Result<AddOutcome, DomainError> {
        self.add_document_uc.execute(document, metadata).await
    }

    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredDocument>, DomainError> {
        self.retrieve_uc.query(text, k).await
    }

    pub async fn try_query(&self, text: &str, k: usize) -> Result<Vec<ScoredDocument>, DomainError> {
        self.retrieve_uc.try_query(text, k).await
    }

    pub async fn process_task(&self, task_description: &str, history: &[String]) -> TaskContext {
        self.process_uc.execute(task_description, history).await
    }

    pub async fn enhance(&self, raw_prompt: &str) -> Result<Enhancement, DomainError> {
        self.enhance_uc.execute(raw_prompt).await
    }

    pub fn stats(&self) -> StoreStats {
        self.stats_uc.stats()
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
