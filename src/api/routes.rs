//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Session lifecycle
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/:id/clear", post(handlers::clear_session))
        // Documents and questions
        .route("/sessions/:id/documents", post(handlers::upload_documents))
        .route("/sessions/:id/ask", post(handlers::ask_question))
        // History
        .route("/sessions/:id/history", get(handlers::get_history))
        .route("/sessions/:id/export", get(handlers::export_history))
        .with_state(state)
}
