//! Axum route handlers for the Knowledge API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::{AppError, AppJson};
use crate::knowledge::loader::load_document_bytes;
use crate::knowledge::qa::{answer_question, AskRequest, AskResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub source: String,
    pub chunks_added: usize,
    pub total_chunks: usize,
}

/// POST /api/v1/knowledge/documents
///
/// Multipart upload (field `file`) of a `.pdf`, `.md` or `.txt` document.
pub async fn handle_upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("file field needs a file name".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        // pdf-extract is CPU-bound
        let name = file_name.clone();
        let document = tokio::task::spawn_blocking(move || load_document_bytes(&name, &bytes))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Document loading task failed: {e}")))?
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let chunks_added = state.knowledge.ingest(&document).await?;

        return Ok(Json(UploadResponse {
            source: file_name,
            chunks_added,
            total_chunks: state.knowledge.chunk_count().await,
        }));
    }

    Err(AppError::Validation(
        "multipart body must contain a 'file' field".to_string(),
    ))
}

/// POST /api/v1/knowledge/ask
pub async fn handle_ask(
    State(state): State<AppState>,
    AppJson(request): AppJson<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let response = answer_question(&state.llm, &state.knowledge, &request).await?;
    Ok(Json(response))
}
