use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Dimension mismatch: store holds {expected}-d vectors, got {actual}-d")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Corrupt store: {0}")]
    Corrupt(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl DomainError {
    /// Embedding provider failures, which callers degrade to "no result" instead of surfacing.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, DomainError::Embedding(_) | DomainError::Parse(_))
    }
}
