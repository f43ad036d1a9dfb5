/// API request handlers
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::error;
use tracing::warn;

use crate::api::types::ApiResponse;
use crate::api::types::HealthResponse;
use crate::config::AppConfig;
use crate::errors::DocChatError;
use crate::session::SessionManager;

pub mod chat;
pub mod session;

pub use chat::*;
pub use session::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub config: Arc<AppConfig>,
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.sessions.count(),
    }))
}

/// Error rendered as an [`ApiResponse`] with the user-facing message
#[derive(Debug)]
pub struct ApiError(pub DocChatError);

impl From<DocChatError> for ApiError {
    fn from(err: DocChatError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            DocChatError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            DocChatError::EmptyDocument => StatusCode::UNPROCESSABLE_ENTITY,
            DocChatError::Extraction { .. }
            | DocChatError::Decode { .. }
            | DocChatError::EmptyQuestion
            | DocChatError::EmptyIndex
            | DocChatError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            DocChatError::EmbeddingService(_) | DocChatError::GenerationService(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_user_error() {
            warn!("Request rejected: {}", self.0);
        } else {
            error!("Request failed: {}", self.0);
        }
        (status, Json(ApiResponse::<()>::error(self.0.user_message()))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
