//! HTTP server implementation

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::rag::RagService;
use crate::session::SessionManager;
use crate::Result;

/// Assemble the router with its middleware stack
pub fn build_app(state: AppState, enable_cors: bool) -> Router {
    let body_limit = state.config.upload.max_request_bytes();

    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        info!("CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("Starting docchat API server...");

    let rag = Arc::new(RagService::new(config)?);
    let sessions = SessionManager::new(rag, config.server.session_timeout_secs);
    let cleanup = sessions.spawn_cleanup_task();

    let state = AppState {
        sessions,
        config: Arc::new(config.clone()),
    };
    let app = build_app(state, enable_cors);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET    /api/health                    - Health check");
    info!("  POST   /api/sessions                  - Start a session");
    info!("  GET    /api/sessions/:id              - Session status");
    info!("  DELETE /api/sessions/:id              - End a session");
    info!("  POST   /api/sessions/:id/documents    - Upload PDF or text files");
    info!("  POST   /api/sessions/:id/ask          - Ask a question");
    info!("  POST   /api/sessions/:id/clear        - Clear history and documents");
    info!("  GET    /api/sessions/:id/history      - Conversation so far");
    info!("  GET    /api/sessions/:id/export       - Download history as CSV");

    let served = axum::serve(listener, app).await;
    cleanup.abort();
    served?;

    Ok(())
}
