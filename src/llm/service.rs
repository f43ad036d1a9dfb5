//! HTTP chat-completion client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Response;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::ChatMessage;
use super::ChatModel;
use super::ChatRole;
use super::GenerationParams;
use crate::config::AppConfig;
use crate::config::ServiceProvider;
use crate::embeddings::client::gemini_model_path;
use crate::errors::DocChatError;
use crate::errors::Result;

/// Language model service backed by a hosted chat API
pub struct LlmService {
    provider: ServiceProvider,
    model: String,
    endpoint: String,
    api_key: String,
    client: Client,
}

impl LlmService {
    /// Create a new LLM service from application config
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm.timeout_secs))
            .build()
            .map_err(|e| DocChatError::HttpError(e.to_string()))?;

        Ok(Self {
            provider: config.llm.provider,
            model: config.llm_model().to_string(),
            endpoint: config.llm_endpoint().trim_end_matches('/').to_string(),
            api_key: config.llm_key().to_string(),
            client,
        })
    }

    async fn complete_gemini(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<String> {
        #[derive(Serialize, Deserialize)]
        struct Part {
            #[serde(default)]
            text: String,
        }

        #[derive(Serialize)]
        struct Content {
            role: &'static str,
            parts: Vec<Part>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            temperature: f32,
            max_output_tokens: usize,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GeminiRequest {
            contents: Vec<Content>,
            generation_config: GenerationConfig,
        }

        #[derive(Deserialize)]
        struct GeminiResponse {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Option<CandidateContent>,
        }

        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<Part>,
        }

        // Gemini calls the assistant "model"
        let contents = messages
            .iter()
            .map(|m| Content {
                role: if m.role == ChatRole::Assistant {
                    "model"
                } else {
                    "user"
                },
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        let url = format!(
            "{}/{}:generateContent",
            self.endpoint,
            gemini_model_path(&self.model)
        );
        debug!("Calling Gemini generateContent API: {}", url);

        let request = GeminiRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocChatError::GenerationService(e.to_string()))?;

        let result: GeminiResponse = ensure_success(response, "Gemini")
            .await?
            .json()
            .await
            .map_err(|e| {
                DocChatError::GenerationService(format!("Failed to parse response: {e}"))
            })?;

        let text: String = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .ok_or_else(|| {
                DocChatError::GenerationService("No candidates in response".to_string())
            })?;

        Ok(text)
    }

    async fn complete_openai(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            temperature: f32,
            max_tokens: usize,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ChatMessage,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling OpenAI chat completions API: {}", url);

        let request = OpenAIRequest {
            model: &self.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| DocChatError::GenerationService(e.to_string()))?;

        let result: OpenAIResponse = ensure_success(response, "OpenAI")
            .await?
            .json()
            .await
            .map_err(|e| {
                DocChatError::GenerationService(format!("Failed to parse response: {e}"))
            })?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| DocChatError::GenerationService("No choices in response".to_string()))
    }

    async fn complete_ollama(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaOptions {
            temperature: f32,
            num_predict: usize,
        }

        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            stream: bool,
            options: OllamaOptions,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            message: ChatMessage,
        }

        let url = format!("{}/api/chat", self.endpoint);
        debug!("Calling Ollama chat API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocChatError::GenerationService(e.to_string()))?;

        let result: OllamaResponse = ensure_success(response, "Ollama")
            .await?
            .json()
            .await
            .map_err(|e| {
                DocChatError::GenerationService(format!("Failed to parse response: {e}"))
            })?;

        Ok(result.message.content)
    }
}

#[async_trait]
impl ChatModel for LlmService {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<String> {
        match self.provider {
            ServiceProvider::Gemini => self.complete_gemini(messages, params).await,
            ServiceProvider::OpenAI => self.complete_openai(messages, params).await,
            ServiceProvider::Ollama => self.complete_ollama(messages, params).await,
        }
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
    Err(DocChatError::GenerationService(format!(
        "{provider} API error ({status}): {error_text}"
    )))
}
