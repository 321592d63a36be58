//! Shared test helpers.
#![allow(dead_code)]

use localmem::application::process_task::ProcessOptions;
use localmem::domain::error::DomainError;
use localmem::domain::ports::chat_port::{ChatMessage, ChatModel, CompletionOptions};
use localmem::domain::ports::embedding_port::EmbeddingProvider;
use localmem::infrastructure::chat::noop::NoopChat;
use localmem::infrastructure::filestore::vector_store::FileVectorStore;
use localmem::LocalMemory;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Embedding provider with hand-picked vectors. Unknown texts fail like an outage would.
#[derive(Default)]
pub struct FakeEmbedder {
    vectors: Mutex<HashMap<String, Vec<f32>>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new(pairs: &[(&str, Vec<f32>)]) -> Arc<Self> {
        let fake = Self::default();
        for (text, v) in pairs {
            fake.insert(text, v.clone());
        }
        Arc::new(fake)
    }

    pub fn insert(&self, text: &str, vector: Vec<f32>) {
        self.vectors.lock().unwrap().insert(text.to_string(), vector);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::Embedding("simulated provider outage".into()));
        }
        let vectors = self.vectors.lock().unwrap();
        texts
            .iter()
            .map(|t| {
                vectors
                    .get(t)
                    .cloned()
                    .ok_or_else(|| DomainError::Embedding(format!("no fake vector for '{t}'")))
            })
            .collect()
    }

    fn model(&self) -> &str {
        "fake-embedding"
    }
}

/// Chat model that answers by matching a keyword in the last message.
#[derive(Default)]
pub struct FakeChat {
    rules: Vec<(String, Result<String, String>)>,
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, keyword: &str, answer: &str) -> Self {
        self.rules.push((keyword.to_string(), Ok(answer.to_string())));
        self
    }

    pub fn fail(mut self, keyword: &str, error: &str) -> Self {
        self.rules.push((keyword.to_string(), Err(error.to_string())));
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ChatModel for FakeChat {
    async fn complete(&self, messages: &[ChatMessage], _options: CompletionOptions) -> Result<String, DomainError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
        for (keyword, answer) in &self.rules {
            if last.contains(keyword.as_str()) {
                return answer.clone().map_err(DomainError::Completion);
            }
        }
        Err(DomainError::Completion("no scripted reply".into()))
    }
}

pub fn setup(embedder: Arc<FakeEmbedder>) -> LocalMemory {
    LocalMemory::with_providers(
        Arc::new(FileVectorStore::in_memory()),
        embedder,
        Arc::new(NoopChat),
        ProcessOptions::default(),
    )
}

pub fn setup_with_chat(embedder: Arc<FakeEmbedder>, chat: Arc<FakeChat>, options: ProcessOptions) -> LocalMemory {
    LocalMemory::with_providers(Arc::new(FileVectorStore::in_memory()), embedder, chat, options)
}

/// Five documents along distinct directions of a 3-d space.
pub fn five_documents() -> Vec<(&'static str, Vec<f32>)> {
    vec![
        ("rust ownership", vec![1.0, 0.0, 0.0]),
        ("python asyncio", vec![0.0, 1.0, 0.0]),
        ("sourdough bread", vec![0.0, 0.0, 1.0]),
        ("rust async", vec![1.0, 1.0, 0.0]),
        ("baking rust", vec![1.0, 0.0, 1.0]),
    ]
}
