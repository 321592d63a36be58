use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;

/// Stand-in when no embedding provider is configured. Every call fails, so
/// ingestion is skipped and retrieval degrades to "no context".
pub struct NoopProvider;

#[async_trait::async_trait]
impl EmbeddingProvider for NoopProvider {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        Err(DomainError::Embedding("no embedding provider configured".into()))
    }

    fn model(&self) -> &str {
        "none"
    }
}
