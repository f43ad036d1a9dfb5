//! Embeddings generation module
//!
//! This module provides functionality for generating text embeddings using various providers:
//! - Google Gemini (models/embedding-001, text-embedding-004)
//! - OpenAI (text-embedding-3-small, etc.) and compatible servers
//! - Ollama (local models)
//!
//! # Examples
//!
//! ```rust,no_run
//! use docchat::config::AppConfig;
//! use docchat::embeddings::Embedder;
//! use docchat::embeddings::EmbeddingService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config)?;
//!
//!     let embedding = service.embed("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;
pub mod text_preprocessing;

use async_trait::async_trait;
pub use client::EmbeddingClient;
pub use generator::EmbeddingService;
pub use text_preprocessing::has_embeddable_text;
pub use text_preprocessing::preprocess_text_for_embedding;

use crate::config::ServiceProvider;
use crate::errors::Result;

/// Turns text into a fixed-dimension vector
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: ServiceProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    #[must_use]
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        Self {
            provider: config.embeddings.provider,
            model: config.embedding_model().to_string(),
            endpoint: config.embedding_endpoint().trim_end_matches('/').to_string(),
            api_key: config.llm_key().to_string(),
            timeout_secs: config.llm.timeout_secs,
        }
    }
}
