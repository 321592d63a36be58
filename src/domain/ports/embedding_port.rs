use crate::domain::error::DomainError;

/// A remote (or fake) embedding model. One call embeds the whole batch, no retry.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError>;

    /// Model name, for logs and stats.
    fn model(&self) -> &str;
}
