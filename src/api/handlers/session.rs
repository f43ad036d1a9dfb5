/// Session lifecycle handlers
use axum::extract::Path;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use super::ApiError;
use super::ApiResult;
use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::CreateSessionResponse;
use crate::api::types::HistoryResponse;
use crate::session::SessionStatus;

/// Start a session (POST /api/sessions)
pub async fn create_session(State(state): State<AppState>) -> ApiResult<CreateSessionResponse> {
    let session_id = state.sessions.create();
    info!("POST /api/sessions -> {}", session_id);
    Ok(Json(ApiResponse::success(CreateSessionResponse { session_id })))
}

/// Session summary (GET /api/sessions/:id)
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionStatus> {
    let handle = state.sessions.get(&session_id)?;
    let status = handle.lock().await.status();
    Ok(Json(ApiResponse::success(status)))
}

/// Tear a session down (DELETE /api/sessions/:id)
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<()> {
    info!("DELETE /api/sessions/{}", session_id);
    state.sessions.delete(&session_id)?;
    Ok(Json(ApiResponse::success(())))
}

/// Drop history and documents (POST /api/sessions/:id/clear)
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionStatus> {
    info!("POST /api/sessions/{}/clear", session_id);
    let handle = state.sessions.get(&session_id)?;
    let mut session = handle.lock().await;
    session.clear();
    Ok(Json(ApiResponse::success(session.status())))
}

/// Conversation so far (GET /api/sessions/:id/history)
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<HistoryResponse> {
    let handle = state.sessions.get(&session_id)?;
    let turns = handle.lock().await.history().turns().to_vec();
    Ok(Json(ApiResponse::success(HistoryResponse { turns })))
}

/// Download the history as CSV (GET /api/sessions/:id/export)
pub async fn export_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/sessions/{}/export", session_id);
    let handle = state.sessions.get(&session_id)?;
    let export = handle.lock().await.export()?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
    ];
    Ok((headers, export.bytes))
}
