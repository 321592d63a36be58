use crate::domain::entities::document::ScoredDocument;
use crate::domain::error::DomainError;
use crate::domain::ports::vector_store::VectorStore;
use crate::infrastructure::embeddings::normalized::NormalizingEmbedder;
use std::sync::Arc;

/// Separator placed between documents when they are merged into one context block.
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

pub struct RetrieveUseCase {
    embedder: NormalizingEmbedder,
    vector_store: Arc<dyn VectorStore>,
}

impl RetrieveUseCase {
    pub fn new(embedder: NormalizingEmbedder, vector_store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, vector_store }
    }

    /// Like `query`, but an embedding failure comes back as an error.
    pub async fn try_query(&self, text: &str, k: usize) -> Result<Vec<ScoredDocument>, DomainError> {
        if self.vector_store.is_empty() || k == 0 {
            return Ok(vec![]);
        }
        let vector = self.embedder.embed_one(text).await?;
        let results = self.vector_store.search_similar(&vector, k)?;
        tracing::debug!(k, hits = results.len(), "Similarity query");
        Ok(results)
    }

    /// Top `k` documents by cosine similarity. An unreachable embedding
    /// provider yields an empty list rather than an error.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredDocument>, DomainError> {
        match self.try_query(text, k).await {
            Err(e) if e.is_provider_failure() => {
                tracing::warn!(error = %e, "Failed to embed query, returning empty results");
                Ok(vec![])
            }
            other => other,
        }
    }
}

/// Joins document texts into one context block, `None` when there is nothing to join.
pub fn join_context(results: &[ScoredDocument]) -> Option<String> {
    if results.is_empty() {
        return None;
    }
    let docs: Vec<&str> = results.iter().map(|r| r.text()).collect();
    Some(docs.join(CONTEXT_SEPARATOR))
}
