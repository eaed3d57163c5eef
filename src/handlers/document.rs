use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use bytes::BytesMut;

use crate::error::{AppError, Result};
use crate::models::{DocumentSummary, MessageResponse, UploadRequest, UploadResponse};
use crate::services::document::PDF_MIME_TYPE;
use crate::AppState;

fn parse_id(id: &str) -> Result<i64> {
    id.parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid document id: {}", id)))
}

/// Upload a PDF document
/// POST /documents/upload (multipart field `file`)
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let max_bytes = state.documents.max_upload_bytes();
    let mut upload: Option<UploadRequest> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        AppError::InvalidInput(format!("Failed to process multipart: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(|s| s.to_string());

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| {
            AppError::InvalidInput(format!("Failed to read file chunk: {}", e))
        })? {
            if data.len() + chunk.len() > max_bytes {
                return Err(AppError::InvalidInput(format!(
                    "File too large (max {} bytes)",
                    max_bytes
                )));
            }
            data.extend_from_slice(&chunk);
        }

        upload = Some(UploadRequest {
            file_name,
            content_type,
            data: data.freeze(),
        });
    }

    let upload = upload.ok_or_else(|| AppError::InvalidInput("No file uploaded".to_string()))?;
    let doc = state.documents.upload(upload).await?;
    Ok(Json(UploadResponse::from(doc)))
}

/// List all documents, newest first
/// GET /documents
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<Vec<DocumentSummary>>> {
    let docs = state.documents.list().await?;
    Ok(Json(docs))
}

/// Download a document
/// GET /documents/:id
pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let (doc, data) = state.documents.fetch_for_download(id).await?;

    let fallback_name = doc.filename.replace(['"', '\\'], "_");
    let encoded_name = urlencoding::encode(&doc.filename);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PDF_MIME_TYPE)
        .header(header::CONTENT_LENGTH, data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"; filename*=UTF-8''{}",
                fallback_name, encoded_name
            ),
        )
        .body(Body::from(data))
        .map_err(|e| AppError::StorageWrite(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// Delete a document
/// DELETE /documents/:id
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    state.documents.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Deleted".to_string(),
    }))
}
