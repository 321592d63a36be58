use crate::domain::entities::document::{AddOutcome, DocumentMetadata};
use crate::domain::error::DomainError;
use crate::domain::ports::vector_store::VectorStore;
use crate::infrastructure::embeddings::normalized::NormalizingEmbedder;
use chrono::Utc;
use std::sync::Arc;

pub struct AddDocumentUseCase {
    embedder: NormalizingEmbedder,
    vector_store: Arc<dyn VectorStore>,
}

impl AddDocumentUseCase {
    pub fn new(embedder: NormalizingEmbedder, vector_store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, vector_store }
    }

    pub async fn execute(&self, text: String, mut metadata: DocumentMetadata) -> Result<AddOutcome, DomainError> {
        let vector = match self.embedder.embed_one(&text).await {
            Ok(v) => v,
            Err(e) if e.is_provider_failure() => {
                tracing::warn!(error = %e, "Failed to embed document, skipping add");
                return Ok(AddOutcome::Skipped { reason: e.to_string() });
            }
            Err(e) => return Err(e),
        };

        metadata.document = text;
        metadata.added_at.get_or_insert_with(Utc::now);

        let index = self.vector_store.append(vector, metadata).await?;
        let total = self.vector_store.len();
        tracing::info!(index, total, "Added new document");
        Ok(AddOutcome::Added { index, total })
    }
}
