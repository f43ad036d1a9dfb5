//! Embedding API clients for various providers

use std::time::Duration;

use reqwest::Client;
use reqwest::Response;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::ServiceProvider;
use crate::errors::DocChatError;
use crate::errors::Result;

/// Client for generating embeddings from various providers
pub struct EmbeddingClient {
    provider: ServiceProvider,
    model: String,
    endpoint: String,
    api_key: String,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        provider: ServiceProvider,
        model: String,
        endpoint: String,
        api_key: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DocChatError::HttpError(e.to_string()))?;

        Ok(Self {
            provider,
            model,
            endpoint,
            api_key,
            client,
        })
    }

    /// Generate embedding for a single text
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON, missing embedding)
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        match self.provider {
            ServiceProvider::Gemini => self.generate_gemini(text).await,
            ServiceProvider::OpenAI => self.generate_openai(text).await,
            ServiceProvider::Ollama => self.generate_ollama(text).await,
        }
    }

    /// Generate embedding using the Gemini `embedContent` API
    async fn generate_gemini(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }

        #[derive(Serialize)]
        struct GeminiRequest<'a> {
            model: &'a str,
            content: Content<'a>,
        }

        #[derive(Deserialize)]
        struct GeminiResponse {
            embedding: GeminiEmbedding,
        }

        #[derive(Deserialize)]
        struct GeminiEmbedding {
            values: Vec<f32>,
        }

        let model = gemini_model_path(&self.model);
        let url = format!("{}/{model}:embedContent", self.endpoint);
        debug!("Calling Gemini embeddings API: {}", url);

        let request = GeminiRequest {
            model: &model,
            content: Content {
                parts: vec![Part { text }],
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocChatError::EmbeddingService(e.to_string()))?;

        let result: GeminiResponse = ensure_success(response, "Gemini")
            .await?
            .json()
            .await
            .map_err(|e| {
                DocChatError::EmbeddingService(format!("Failed to parse response: {e}"))
            })?;

        Ok(result.embedding.values)
    }

    /// Generate embedding using `OpenAI` API
    async fn generate_openai(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            input: &'a str,
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let url = format!("{}/embeddings", self.endpoint);
        debug!("Calling OpenAI embeddings API: {}", url);

        let request = OpenAIRequest {
            input: text,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| DocChatError::EmbeddingService(e.to_string()))?;

        let result: OpenAIResponse = ensure_success(response, "OpenAI")
            .await?
            .json()
            .await
            .map_err(|e| {
                DocChatError::EmbeddingService(format!("Failed to parse response: {e}"))
            })?;

        result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| DocChatError::EmbeddingService("No embedding in response".to_string()))
    }

    /// Generate embedding using Ollama API
    async fn generate_ollama(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.endpoint);
        debug!("Calling Ollama embeddings API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocChatError::EmbeddingService(e.to_string()))?;

        let result: OllamaResponse = ensure_success(response, "Ollama")
            .await?
            .json()
            .await
            .map_err(|e| {
                DocChatError::EmbeddingService(format!("Failed to parse response: {e}"))
            })?;

        Ok(result.embedding)
    }
}

async fn ensure_success(response: Response, provider: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(DocChatError::EmbeddingService(format!(
        "{provider} API error ({status}): {error_text}"
    )))
}

/// Gemini addresses models as `models/<name>`
pub(crate) fn gemini_model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_model_path() {
        assert_eq!(gemini_model_path("embedding-001"), "models/embedding-001");
        assert_eq!(
            gemini_model_path("models/text-embedding-004"),
            "models/text-embedding-004"
        );
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_gemini_embedding() {
        let client = EmbeddingClient::new(
            ServiceProvider::Gemini,
            "models/embedding-001".to_string(),
            ServiceProvider::Gemini.default_endpoint().to_string(),
            std::env::var("GOOGLE_API_KEY").unwrap_or_default(),
            30,
        )
        .unwrap();

        let embedding = client.generate("Hello, world!").await.unwrap();
        assert_eq!(embedding.len(), 768);
    }
}
