//! Settings come from a JSON file (`config/llm_config.json` unless
//! `LOCALMEM_CONFIG` points elsewhere) with every field overridable by an
//! environment variable. Environment wins.

use crate::domain::error::DomainError;
use crate::infrastructure::filestore::codec::CorruptionPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/llm_config.json";
pub const DEFAULT_DATA_DIR: &str = "./vector_db_data";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatLlmConfig {
    pub api_type: String,
    pub base_url: String,
    pub api_key: String,
    pub model_name: String,
}

impl ChatLlmConfig {
    pub fn is_complete(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty() && !self.model_name.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub base_url: String,
    pub api_key: String,
    pub model_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    OpenAi,
    None,
}

impl EmbeddingConfig {
    /// An unset provider means OpenAI when a key or endpoint is given, otherwise none.
    pub fn backend(&self) -> Result<EmbeddingBackend, DomainError> {
        match self.provider.to_lowercase().as_str() {
            "" if self.api_key.is_empty() && self.base_url.is_empty() => Ok(EmbeddingBackend::None),
            "" | "openai" | "openai_compatible" => Ok(EmbeddingBackend::OpenAi),
            "none" | "noop" => Ok(EmbeddingBackend::None),
            other => Err(DomainError::Config(format!(
                "Unknown embedding provider: '{other}'. Use 'openai' or 'none'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub on_corrupt: CorruptionPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            on_corrupt: CorruptionPolicy::Fail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub k: usize,
    pub relevance_gate: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: 2,
            relevance_gate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chat_llm: ChatLlmConfig,
    pub embedding: EmbeddingConfig,
    pub store: StoreConfig,
    pub retrieval: RetrievalConfig,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chat_llm: ChatLlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            store: StoreConfig::default(),
            retrieval: RetrievalConfig::default(),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Reads the config file (if present) and applies process environment overrides.
    pub fn load() -> Result<Self, DomainError> {
        let path = std::env::var("LOCALMEM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let file = read_optional(Path::new(&path))?;
        Self::from_sources(file.as_deref(), |name| std::env::var(name).ok())
    }

    /// Builds settings from raw JSON text and an environment lookup.
    pub fn from_sources(
        file: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DomainError> {
        let mut settings: Settings = match file {
            Some(text) => serde_json::from_str(text)
                .map_err(|e| DomainError::Config(format!("config file is not valid JSON: {e}")))?,
            None => Settings::default(),
        };

        let set = |target: &mut String, name: &str| {
            if let Some(v) = env(name) {
                *target = v;
            }
        };
        set(&mut settings.chat_llm.api_type, "CHAT_API_TYPE");
        set(&mut settings.chat_llm.base_url, "CHAT_BASE_URL");
        set(&mut settings.chat_llm.api_key, "CHAT_API_KEY");
        set(&mut settings.chat_llm.model_name, "CHAT_MODEL_NAME");
        set(&mut settings.embedding.provider, "EMBEDDING_PROVIDER");
        set(&mut settings.embedding.base_url, "EMBEDDING_BASE_URL");
        set(&mut settings.embedding.api_key, "EMBEDDING_API_KEY");
        set(&mut settings.embedding.model_name, "EMBEDDING_MODEL_NAME");

        if let Some(dir) = env("LOCALMEM_DATA_DIR") {
            settings.store.data_dir = PathBuf::from(dir);
        }
        if let Some(policy) = env("LOCALMEM_ON_CORRUPT") {
            settings.store.on_corrupt = policy.parse().map_err(DomainError::Config)?;
        }
        if let Some(k) = env("LOCALMEM_RETRIEVAL_K") {
            settings.retrieval.k = parse_env("LOCALMEM_RETRIEVAL_K", &k)?;
        }
        if let Some(gate) = env("LOCALMEM_RELEVANCE_GATE") {
            settings.retrieval.relevance_gate = parse_env("LOCALMEM_RELEVANCE_GATE", &gate)?;
        }
        if let Some(secs) = env("LOCALMEM_REQUEST_TIMEOUT_SECS") {
            settings.request_timeout_secs = parse_env("LOCALMEM_REQUEST_TIMEOUT_SECS", &secs)?;
        }

        if settings.chat_llm.api_type.is_empty() {
            settings.chat_llm.api_type = "openai_compatible".into();
        }
        match settings.chat_llm.api_type.as_str() {
            "openai" | "openai_compatible" => {}
            other => {
                return Err(DomainError::Config(format!(
                    "Unsupported chat api_type: '{other}'. Use 'openai_compatible'"
                )))
            }
        }
        settings.embedding.backend()?;

        if settings.retrieval.k == 0 {
            return Err(DomainError::Config("retrieval.k must be at least 1".into()));
        }
        if settings.request_timeout_secs == 0 {
            return Err(DomainError::Config("request_timeout_secs must be at least 1".into()));
        }

        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, DomainError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DomainError::Config(format!("cannot read {}: {e}", path.display()))),
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, DomainError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| DomainError::Config(format!("{name}={value}: {e}")))
}
