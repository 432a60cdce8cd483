use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::query::RetrievalProfile;
use crate::rag::{DistanceMetric, ScoreMode};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_GENERATION_MODEL: &str = "llama3.2";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Typed view of `config.yml` (+ `secrets.yaml`). Every field has a default,
/// so an absent file yields a working local Ollama setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_allowed_origins: Vec::new(),
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub path: PathBuf,
    pub distance: DistanceMetric,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("chroma/rag.db"),
            distance: DistanceMetric::Cosine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Ollama,
    #[serde(alias = "openai")]
    LmStudio,
}

/// Where a provider lives. Shared by the embedding and generation sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub kind: ProviderKind,
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: ProviderKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key: None,
        }
    }
}

impl EmbeddingConfig {
    pub fn endpoint(&self) -> ProviderEndpoint {
        ProviderEndpoint {
            kind: self.provider,
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Upper bound for each of the two generation calls.
    pub timeout_secs: u64,
    /// Refuse to start when the backend does not answer its health check.
    pub check_on_startup: bool,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<i32>,
    pub stop: Option<Vec<String>>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_GENERATION_MODEL.to_string(),
            api_key: None,
            timeout_secs: 120,
            check_on_startup: true,
            temperature: None,
            top_p: None,
            max_tokens: None,
            stop: None,
        }
    }
}

impl LlmConfig {
    pub fn endpoint(&self) -> ProviderEndpoint {
        ProviderEndpoint {
            kind: self.provider,
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Profile used by `POST /query`.
    pub server: RetrievalProfile,
    /// Profile used by the `query-data` command.
    pub cli: RetrievalProfile,
    pub max_context_chars: Option<usize>,
    /// Deadline for one similarity search, query embedding included.
    pub timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            server: RetrievalProfile {
                k: 1,
                score_mode: ScoreMode::Normalized,
            },
            cli: RetrievalProfile {
                k: 5,
                score_mode: ScoreMode::Raw,
            },
            max_context_chars: None,
            timeout_secs: 60,
        }
    }
}
