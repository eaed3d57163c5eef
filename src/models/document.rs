use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Document record as stored in the `documents` table
#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct Document {
    pub id: i64,
    /// Original client-supplied file name
    pub filename: String,
    /// Storage key of the blob holding the content
    pub filepath: String,
    pub filesize: i64,
    pub uploaded_at: String,
}

/// Document record before the store has assigned an id
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub filename: String,
    pub filepath: String,
    pub filesize: i64,
    pub uploaded_at: String,
}

/// List entry; the storage key stays internal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSummary {
    pub id: i64,
    pub filename: String,
    pub filesize: i64,
    pub uploaded_at: String,
}

impl From<Document> for DocumentSummary {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename,
            filesize: doc.filesize,
            uploaded_at: doc.uploaded_at,
        }
    }
}

/// Upload response
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub id: i64,
    pub filename: String,
    pub size: i64,
    pub uploaded_at: String,
}

impl From<Document> for UploadResponse {
    fn from(doc: Document) -> Self {
        Self {
            message: "Uploaded".to_string(),
            id: doc.id,
            filename: doc.filename,
            size: doc.filesize,
            uploaded_at: doc.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub message: String,
}

/// Upload request handed from the HTTP layer to the document service
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: bytes::Bytes,
}
