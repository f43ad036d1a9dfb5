//! Embedding generation service

use std::sync::Arc;

use async_trait::async_trait;

use super::client::EmbeddingClient;
use super::Embedder;
use super::EmbeddingConfig;
use crate::errors::Result;

/// Service for generating embeddings from preprocessed text
pub struct EmbeddingService {
    client: Arc<EmbeddingClient>,
}

impl EmbeddingService {
    /// Create a new embedding service
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(EmbeddingConfig::from_app_config(config))
    }

    /// Create from custom config
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model,
            config.endpoint,
            config.api_key,
            config.timeout_secs,
        )?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Generate embedding for a single text
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        // Preprocess text to handle newlines and invalid characters
        let processed_text = crate::embeddings::preprocess_text_for_embedding(text)?;

        self.client.generate(&processed_text).await
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.generate(text).await
    }
}
