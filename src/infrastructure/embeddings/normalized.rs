use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::values::vector::normalize;
use std::sync::Arc;

/// Wraps a provider so every row it hands out is unit length.
///
/// A batch is rejected as a whole when the provider returns the wrong number of
/// rows, rows of differing length, or a row whose norm is zero.
#[derive(Clone)]
pub struct NormalizingEmbedder {
    provider: Arc<dyn EmbeddingProvider>,
}

impl NormalizingEmbedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let raw = self.provider.embed(texts).await?;
        if raw.len() != texts.len() {
            return Err(DomainError::Embedding(format!(
                "provider returned {} embeddings for {} inputs",
                raw.len(),
                texts.len()
            )));
        }

        let dim = raw[0].len();
        let mut rows = Vec::with_capacity(raw.len());
        for (i, row) in raw.iter().enumerate() {
            if row.len() != dim {
                return Err(DomainError::Embedding(format!(
                    "embedding {i} has {} dimensions, expected {dim}",
                    row.len()
                )));
            }
            let unit = normalize(row).ok_or_else(|| {
                DomainError::Embedding(format!("embedding {i} is a zero or non-finite vector"))
            })?;
            rows.push(unit);
        }
        Ok(rows)
    }

    /// Embeds a single text and returns its unit vector.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let mut rows = self.embed(&[text.to_string()]).await?;
        rows.pop()
            .ok_or_else(|| DomainError::Embedding("provider returned no embedding".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::vector::l2_norm;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        rows: Vec<Vec<f32>>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for Fixed {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.clone())
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    fn embedder(rows: Vec<Vec<f32>>) -> (NormalizingEmbedder, Arc<Fixed>) {
        let fixed = Arc::new(Fixed { rows, calls: AtomicUsize::new(0) });
        (NormalizingEmbedder::new(fixed.clone()), fixed)
    }

    #[tokio::test]
    async fn test_rows_are_unit_length() {
        let (e, _) = embedder(vec![vec![3.0, 4.0], vec![0.0, -2.0]]);
        let rows = e.embed(&["a".into(), "b".into()]).await.unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert!((l2_norm(row) - 1.0).abs() < 1e-6);
        }
        assert_eq!(rows[1], vec![0.0, -1.0]);
    }

    #[tokio::test]
    async fn test_empty_input_skips_provider() {
        let (e, fixed) = embedder(vec![vec![1.0]]);
        let rows = e.embed(&[]).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(fixed.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_vector_rejected() {
        let (e, _) = embedder(vec![vec![1.0, 0.0], vec![0.0, 0.0]]);
        let err = e.embed(&["a".into(), "b".into()]).await.unwrap_err();
        assert!(matches!(err, DomainError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_row_count_mismatch_rejected() {
        let (e, _) = embedder(vec![vec![1.0, 0.0]]);
        let err = e.embed(&["a".into(), "b".into()]).await.unwrap_err();
        assert!(err.is_provider_failure());
    }

    #[tokio::test]
    async fn test_ragged_rows_rejected() {
        let (e, _) = embedder(vec![vec![1.0, 0.0], vec![1.0]]);
        assert!(e.embed(&["a".into(), "b".into()]).await.is_err());
    }
}
