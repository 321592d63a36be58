use crate::domain::ports::vector_store::VectorStore;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub documents: usize,
    pub dimension: Option<usize>,
    pub embedding_model: String,
    pub sources: Vec<SourceCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: usize,
}

pub struct StatsUseCase {
    vector_store: Arc<dyn VectorStore>,
    embedding_model: String,
}

impl StatsUseCase {
    pub fn new(vector_store: Arc<dyn VectorStore>, embedding_model: String) -> Self {
        Self {
            vector_store,
            embedding_model,
        }
    }

    pub fn stats(&self) -> StoreStats {
        let metadata = self.vector_store.metadata();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for m in &metadata {
            *counts.entry(m.source.as_str()).or_default() += 1;
        }
        let mut sources: Vec<SourceCount> = counts
            .into_iter()
            .map(|(source, count)| SourceCount {
                source: source.to_string(),
                count,
            })
            .collect();
        sources.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.source.cmp(&b.source)));

        StoreStats {
            documents: metadata.len(),
            dimension: self.vector_store.dimension(),
            embedding_model: self.embedding_model.clone(),
            sources,
        }
    }
}
