use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::storage::BlobStore;

const MAX_NAME_BYTES: usize = 200;
const FALLBACK_NAME: &str = "document.pdf";

/// Local file system blob store. Every blob is a flat file in `base_path`.
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Resolve a key to its file, or `None` if the key could not have
    /// been produced by `put`.
    fn get_full_path(&self, storage_key: &str) -> Option<PathBuf> {
        if storage_key.is_empty()
            || storage_key.starts_with('.')
            || storage_key.contains(['/', '\\', '\0'])
        {
            return None;
        }
        Some(self.base_path.join(storage_key))
    }
}

/// Map a client-supplied file name to a name that is safe to use as a
/// single path component.
///
/// Only the last path component survives, whitespace runs become `_`,
/// control characters are dropped and leading dots are stripped.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");

    let mut out = String::with_capacity(base.len());
    let mut in_whitespace = false;
    for c in base.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if !c.is_control() {
            out.push(c);
        }
    }

    let trimmed = out.trim_start_matches('.');
    let mut end = trimmed.len().min(MAX_NAME_BYTES);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    let result = &trimmed[..end];

    if result.is_empty() || result.chars().all(|c| c == '_') {
        FALLBACK_NAME.to_string()
    } else {
        result.to_string()
    }
}

/// Build a storage key: millisecond timestamp, a random component so that
/// same-millisecond uploads of one name never collide, then the safe name.
pub fn generate_storage_key(suggested_name: &str) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        &nonce[..8],
        sanitize_file_name(suggested_name)
    )
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, data: Bytes, suggested_name: &str) -> Result<String> {
        let storage_key = generate_storage_key(suggested_name);
        let full_path = self.base_path.join(&storage_key);
        // Dot-prefixed, so it can never be mistaken for a finished blob
        let temp_path = self.base_path.join(format!(".{}.part", storage_key));

        let write = async {
            fs::create_dir_all(&self.base_path).await?;
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &full_path).await
        };

        if let Err(e) = write.await {
            let _ = fs::remove_file(&temp_path).await;
            tracing::warn!(storage_key = %storage_key, error = %e, "Blob write failed");
            return Err(AppError::StorageWrite(format!(
                "Failed to write {}: {}",
                storage_key, e
            )));
        }

        tracing::debug!(storage_key = %storage_key, size = data.len(), "Saved blob to {:?}", full_path);
        Ok(storage_key)
    }

    async fn get(&self, storage_key: &str) -> Result<Bytes> {
        let full_path = self
            .get_full_path(storage_key)
            .ok_or_else(|| AppError::BlobNotFound(storage_key.to_string()))?;

        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::BlobNotFound(storage_key.to_string())
            } else {
                AppError::StorageWrite(format!("Failed to read {}: {}", storage_key, e))
            }
        })?;

        Ok(Bytes::from(data))
    }

    async fn delete(&self, storage_key: &str) -> Result<()> {
        let Some(full_path) = self.get_full_path(storage_key) else {
            tracing::debug!(storage_key = %storage_key, "Ignoring delete of invalid storage key");
            return Ok(());
        };

        match fs::remove_file(&full_path).await {
            Ok(()) => {
                tracing::debug!("Deleted blob {:?}", full_path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(storage_key = %storage_key, "Blob already absent");
                Ok(())
            }
            Err(e) => Err(AppError::StorageWrite(format!(
                "Failed to delete {}: {}",
                storage_key, e
            ))),
        }
    }

    fn storage_type(&self) -> &'static str {
        "local"
    }
}
