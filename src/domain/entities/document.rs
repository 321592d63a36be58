use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_SOURCE: &str = "user_provided";

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

/// Metadata stored alongside each vector. `document` always holds the exact text
/// that was embedded; any keys beyond the fixed ones land in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub document: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentMetadata {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            document: String::new(),
            source: source.into(),
            added_at: None,
            extra: Map::new(),
        }
    }

    /// Builds metadata from a free-form JSON object, lifting `source` out of it.
    pub fn from_json(source: Option<String>, value: Option<Value>) -> Result<Self, String> {
        let mut extra = match value {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => return Err(format!("Metadata must be a JSON object, got {other}")),
        };
        // The stored text is always the embedded text, never caller-supplied.
        extra.remove("document");
        extra.remove("added_at");
        let embedded_source = match extra.remove("source") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        let mut meta = Self::new(source.or(embedded_source).unwrap_or_else(default_source));
        meta.extra = extra;
        Ok(meta)
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE)
    }
}

/// One query hit: cosine similarity paired with the stored metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub similarity: f64,
    pub metadata: DocumentMetadata,
}

impl ScoredDocument {
    pub fn text(&self) -> &str {
        &self.metadata.document
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AddOutcome {
    /// Appended at `index`; the store now holds `total` documents.
    Added { index: usize, total: usize },
    /// Embedding failed, nothing was stored or persisted.
    Skipped { reason: String },
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added { .. })
    }
}
