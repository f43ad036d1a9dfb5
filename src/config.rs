use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::rag::GeneratorMode;

/// Environment variables accepted as shortcuts for `llm.api_key`, in priority order
pub const API_KEY_ENV_VARS: [&str; 3] = ["DOCCHAT_API_KEY", "GOOGLE_API_KEY", "OPENAI_API_KEY"];

/// Hosted model provider behind the embedding and chat endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceProvider {
    /// Google Generative Language API
    #[default]
    Gemini,
    /// `OpenAI` or any OpenAI-compatible server
    #[serde(rename = "openai")]
    OpenAI,
    /// Local Ollama server
    Ollama,
}

impl ServiceProvider {
    #[must_use]
    pub const fn default_endpoint(self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default)]
    pub provider: ServiceProvider,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Overrides the provider's default base URL
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Maximum embedding requests in flight while building an index
    #[serde(default = "default_embedding_concurrency")]
    pub concurrency: usize,
}

fn default_embedding_model() -> String {
    "models/embedding-001".to_string()
}

const fn default_embedding_concurrency() -> usize {
    8
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: ServiceProvider::default(),
            model: default_embedding_model(),
            endpoint: None,
            concurrency: default_embedding_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ServiceProvider,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// API credential shared by the embedding and chat endpoints
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_model() -> String {
    "gemini-2.0-flash".to_string()
}

const fn default_temperature() -> f32 {
    0.3
}

const fn default_max_tokens() -> usize {
    1024
}

const fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ServiceProvider::default(),
            endpoint: None,
            api_key: String::new(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum passage length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters shared between consecutive passages
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

const fn default_chunk_size() -> usize {
    1000
}

const fn default_chunk_overlap() -> usize {
    200
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

const fn default_top_k() -> usize {
    4
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub mode: GeneratorMode,
    /// Most recent turns included in memory-aware prompts
    #[serde(default = "default_memory_turns")]
    pub memory_turns: usize,
}

const fn default_memory_turns() -> usize {
    10
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: GeneratorMode::default(),
            memory_turns: default_memory_turns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Upper bound on each uploaded file
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

const fn default_max_file_bytes() -> usize {
    200 * 1024 * 1024
}

const fn default_max_files() -> usize {
    20
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            max_files: default_max_files(),
        }
    }
}

/// Room for multipart boundaries and part headers
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

impl UploadConfig {
    /// Body limit for an upload request carrying `max_files` full-size files
    #[must_use]
    pub const fn max_request_bytes(&self) -> usize {
        self.max_file_bytes
            .saturating_mul(self.max_files)
            .saturating_add(MULTIPART_OVERHEAD_BYTES)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,
    #[serde(default)]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8501
}

const fn default_session_timeout() -> u64 {
    3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_timeout_secs: default_session_timeout(),
            enable_cors: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from `config.toml` (optional) layered with
    /// `DOCCHAT__SECTION__FIELD` environment variables, then validate it.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None)
    }

    /// Same as [`AppConfig::load`] with an explicit config file path
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        let file_source = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let mut config: Self = config::Config::builder()
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix("DOCCHAT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.apply_api_key_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Fill an empty credential from the shortcut environment variables
    pub fn apply_api_key_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.llm.api_key.trim().is_empty() {
            return;
        }
        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            self.llm.api_key = key;
        }
    }

    /// Reject configurations the app cannot start with
    pub fn validate(&self) -> crate::Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(crate::DocChatError::MissingApiKey);
        }
        if self.chunking.chunk_size == 0 {
            return Err(crate::DocChatError::ConfigError(
                "chunking.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(crate::DocChatError::ConfigError(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(crate::DocChatError::ConfigError(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL for the embedding API
    pub fn embedding_endpoint(&self) -> &str {
        self.embeddings
            .endpoint
            .as_deref()
            .unwrap_or_else(|| self.embeddings.provider.default_endpoint())
    }

    /// Base URL for the chat API
    pub fn llm_endpoint(&self) -> &str {
        self.llm
            .endpoint
            .as_deref()
            .unwrap_or_else(|| self.llm.provider.default_endpoint())
    }

    /// Get LLM key
    pub fn llm_key(&self) -> &str {
        &self.llm.api_key
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.model
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Copy of this config safe to print: the credential is masked
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.llm.api_key.is_empty() {
            let visible: String = copy.llm.api_key.chars().take(4).collect();
            copy.llm.api_key = format!("{visible}****");
        }
        copy
    }
}
