use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Document, DocumentSummary, NewDocument, UploadRequest};
use crate::services::DocumentStore;
use crate::storage::BlobStore;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Document lifecycle service.
///
/// Coordinates the blob store and the metadata store. There is no
/// transaction spanning the two: a record is only written after its blob,
/// and on delete the blob goes first on a best-effort basis while the
/// record removal is authoritative.
#[derive(Clone)]
pub struct DocumentService {
    blobs: Arc<dyn BlobStore>,
    store: Arc<dyn DocumentStore>,
    max_upload_bytes: usize,
}

impl DocumentService {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        store: Arc<dyn DocumentStore>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            blobs,
            store,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Upload a document
    pub async fn upload(&self, req: UploadRequest) -> Result<Document> {
        if !is_pdf(req.content_type.as_deref()) {
            return Err(AppError::InvalidInput("Only PDF files are allowed".to_string()));
        }
        if req.data.len() > self.max_upload_bytes {
            return Err(AppError::InvalidInput(format!(
                "File too large (max {} bytes)",
                self.max_upload_bytes
            )));
        }
        if req.file_name.trim().is_empty() {
            return Err(AppError::InvalidInput("No file name provided".to_string()));
        }

        let size = req.data.len() as i64;
        let storage_key = self.blobs.put(req.data, &req.file_name).await?;

        let draft = NewDocument {
            filename: req.file_name,
            filepath: storage_key.clone(),
            filesize: size,
            uploaded_at: now_iso8601(),
        };

        let doc = match self.store.insert(draft).await {
            Ok(doc) => doc,
            Err(e) => {
                // The blob stays behind; there is nothing to roll back into
                tracing::warn!(storage_key = %storage_key, "Orphaned blob after failed metadata insert");
                return Err(e);
            }
        };

        tracing::info!(id = doc.id, storage_key = %doc.filepath, size = doc.filesize, "Document uploaded");
        Ok(doc)
    }

    /// List documents, newest first
    pub async fn list(&self) -> Result<Vec<DocumentSummary>> {
        let docs = self.store.list().await?;
        Ok(docs.into_iter().map(DocumentSummary::from).collect())
    }

    /// Get a document and its content for download.
    ///
    /// A record whose blob is gone yields `BlobNotFound`; the record is kept.
    pub async fn fetch_for_download(&self, id: i64) -> Result<(Document, Bytes)> {
        let doc = self.get_document(id).await?;
        let data = self.blobs.get(&doc.filepath).await?;
        Ok((doc, data))
    }

    /// Delete a document
    pub async fn delete(&self, id: i64) -> Result<()> {
        let doc = self.get_document(id).await?;

        if let Err(e) = self.blobs.delete(&doc.filepath).await {
            tracing::warn!(id, storage_key = %doc.filepath, "File deletion warning: {}", e);
        }

        self.store.delete_by_id(id).await?;
        tracing::info!(id, "Document deleted");
        Ok(())
    }

    async fn get_document(&self, id: i64) -> Result<Document> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
    }
}

/// Check a declared content type, ignoring parameters such as `charset`.
fn is_pdf(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MIME_TYPE))
        .unwrap_or(false)
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
