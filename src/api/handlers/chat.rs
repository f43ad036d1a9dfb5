/// Upload and question handlers
use axum::extract::Multipart;
use axum::extract::Path;
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::ApiResult;
use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::AskRequest;
use crate::api::types::AskResponse;
use crate::documents::UploadedFile;
use crate::errors::DocChatError;
use crate::errors::Result;
use crate::rag::IndexReport;

/// Multipart field names accepted as files
const FILE_FIELDS: [&str; 2] = ["file", "files"];

/// Replace the session's documents (POST /api/sessions/:id/documents)
pub async fn upload_documents(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<IndexReport> {
    let handle = state.sessions.get(&session_id)?;
    let upload = &state.config.upload;
    let files = read_files(multipart, upload.max_files, upload.max_file_bytes).await?;
    info!(
        "POST /api/sessions/{}/documents: {} files",
        session_id,
        files.len()
    );

    let report = handle.lock().await.upload(files).await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Ask a question (POST /api/sessions/:id/ask)
pub async fn ask_question(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<AskRequest>,
) -> ApiResult<AskResponse> {
    info!("POST /api/sessions/{}/ask: {}", session_id, req.question);
    let handle = state.sessions.get(&session_id)?;
    let mut session = handle.lock().await;

    match session.ask(&req.question).await {
        Ok(response) => Ok(Json(ApiResponse::success(response.into()))),
        // No documents yet: answered with a notice
        Err(e @ DocChatError::EmptyIndex) => {
            Ok(Json(ApiResponse::success(AskResponse::notice(e.user_message()))))
        }
        Err(e) => Err(e.into()),
    }
}

async fn read_files(
    mut multipart: Multipart,
    max_files: usize,
    max_file_bytes: usize,
) -> Result<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DocChatError::InvalidRequest(format!("Malformed upload: {e}")))?
    {
        if !field.name().is_some_and(|name| FILE_FIELDS.contains(&name)) {
            continue;
        }

        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| DocChatError::InvalidRequest(format!("Could not read {name}: {e}")))?;

        if bytes.len() > max_file_bytes {
            return Err(DocChatError::InvalidRequest(format!(
                "{name} exceeds the per-file limit of {max_file_bytes} bytes."
            )));
        }
        if files.len() == max_files {
            return Err(DocChatError::InvalidRequest(format!(
                "At most {max_files} files can be uploaded at once."
            )));
        }

        files.push(UploadedFile::new(name, content_type.as_deref(), bytes.to_vec()));
    }

    Ok(files)
}
