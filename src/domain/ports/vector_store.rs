use crate::domain::entities::document::{DocumentMetadata, ScoredDocument};
use crate::domain::error::DomainError;

/// Append-only store of unit vectors, each aligned by index with its metadata.
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Appends one record and persists the full state. Returns the new record's index.
    async fn append(&self, vector: Vec<f32>, metadata: DocumentMetadata) -> Result<usize, DomainError>;

    /// Ranks every stored vector against `vector` and returns the best `limit`.
    fn search_similar(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredDocument>, DomainError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension of stored vectors, `None` while the store is empty.
    fn dimension(&self) -> Option<usize>;

    fn metadata(&self) -> Vec<DocumentMetadata>;
}
