use serde::Deserialize;
use std::path::Path;

use crate::application::{ChatTexts, IngestionTexts};
use crate::domain::EmbeddingModel;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
pub const DEFAULT_PROMPTS_PATH: &str = "config/prompts.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings plus every user-facing text, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Loads `CONFIG_PATH` and `PROMPTS_PATH` (or their defaults), then
    /// applies environment overrides. Missing files fall back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let prompts_path =
            std::env::var("PROMPTS_PATH").unwrap_or_else(|_| DEFAULT_PROMPTS_PATH.into());

        let mut app = Self {
            config: load_yaml(&config_path)?,
            prompts: load_yaml(&prompts_path)?,
        };
        app.config.apply_env_overrides()?;
        Ok(app)
    }
}

fn load_yaml<T: for<'de> Deserialize<'de> + Default>(path: &str) -> Result<T, ConfigError> {
    if !Path::new(path).exists() {
        tracing::warn!(path, "config file not found, using defaults");
        return Ok(T::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_yaml(path, &raw)
}

fn parse_yaml<T: for<'de> Deserialize<'de> + Default>(
    path: &str,
    raw: &str,
) -> Result<T, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub vector_store: VectorStoreConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub rag: RagConfig,
    pub slack: SlackConfig,
    pub worker: WorkerConfig,
}

impl Config {
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::Invalid {
                key: "SERVER_PORT",
                value: port,
            })?;
        }
        if let Ok(url) = std::env::var("QDRANT_URL") {
            self.vector_store.url = url;
        }
        if let Ok(url) = std::env::var("REDIS_URL") {
            self.worker.redis_url = url;
        }
        if let Ok(timeout) = std::env::var("WORKER_JOB_TIMEOUT_SECONDS") {
            self.worker.job_timeout_seconds =
                timeout.parse().map_err(|_| ConfigError::Invalid {
                    key: "WORKER_JOB_TIMEOUT_SECONDS",
                    value: timeout,
                })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreBackend {
    #[default]
    Qdrant,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: VectorStoreBackend,
    pub url: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorStoreBackend::Qdrant,
            url: "http://localhost:6334".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// OpenAI-compatible embeddings endpoint; honours `OPENAI_BASE_URL`.
    #[default]
    Openai,
    /// Deterministic feature hashing, no network.
    Hashed,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub connect_timeout_seconds: u64,
    /// Longest gap between two reads of a streaming response.
    pub read_timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            connect_timeout_seconds: 10,
            read_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub answer_limit: usize,
    pub chat_limit: usize,
    pub chat_model: EmbeddingModel,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            answer_limit: 10,
            chat_limit: 3,
            chat_model: EmbeddingModel::BgeM3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub api_base_url: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://slack.com/api".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackend {
    /// Spawn jobs on the API process's own runtime.
    #[default]
    Inline,
    /// Push jobs to Redis for the `worker` binary.
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub backend: QueueBackend,
    pub redis_url: String,
    /// Upper bound on one detached run; an overrunning run is abandoned
    /// and reported to the user.
    pub job_timeout_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            backend: QueueBackend::Inline,
            redis_url: "redis://localhost:6379".to_string(),
            job_timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub system: String,
    /// Retrieval prompt; `{question}` and `{context}`.
    pub rag_template: String,
    pub chat: ChatTexts,
    pub ingestion: IngestionTexts,
    pub slack: SlackTexts,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant.".to_string(),
            rag_template: concat!(
                "Here is the user's question:\n\n",
                "\"{question}\"\n\n",
                "And here are the related documents:\n\n",
                "{context}\n\n",
                "Using this information, answer the question helpfully and concisely."
            )
            .to_string(),
            chat: ChatTexts::default(),
            ingestion: IngestionTexts::default(),
            slack: SlackTexts::default(),
        }
    }
}

/// Immediate slash-command replies.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SlackTexts {
    pub greeting: String,
    pub processing: String,
    pub dispatch_failed: String,
    /// `{error}`.
    pub modal_failed: String,
}

impl Default for SlackTexts {
    fn default() -> Self {
        Self {
            greeting: "Hi! Ask me a question, e.g. `/ask What is the capital of France?`"
                .to_string(),
            processing: ":hourglass: Processing your question...".to_string(),
            dispatch_failed: "Sorry, your question could not be queued. Please try again."
                .to_string(),
            modal_failed: "Could not open the form: {error}".to_string(),
        }
    }
}
