//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::rag::RagResponse;
use crate::rag::SearchResult;
use crate::session::ConversationTurn;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Question request
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Answer, or a notice when the session has no documents yet
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standalone_question: Option<String>,
    pub sources: Vec<SourcePassage>,
}

impl AskResponse {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            notice: Some(message.into()),
            ..Self::default()
        }
    }
}

impl From<RagResponse> for AskResponse {
    fn from(response: RagResponse) -> Self {
        Self {
            answer: Some(response.answer),
            notice: None,
            standalone_question: response.standalone_question,
            sources: response.sources.into_iter().map(SourcePassage::from).collect(),
        }
    }
}

/// Passage an answer was based on
#[derive(Debug, Serialize, Deserialize)]
pub struct SourcePassage {
    pub position: usize,
    pub text: String,
    pub score: f32,
}

impl From<SearchResult> for SourcePassage {
    fn from(result: SearchResult) -> Self {
        Self {
            position: result.position,
            text: result.text,
            score: result.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub turns: Vec<ConversationTurn>,
}
