use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Blob store: durable storage for uploaded document content.
///
/// The store is content-agnostic. Type and size limits are enforced
/// by the caller before anything reaches `put`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `data` under a fresh key derived from `suggested_name` and
    /// return that key. Fails with `StorageWrite`; nothing is left behind.
    async fn put(&self, data: Bytes, suggested_name: &str) -> Result<String>;

    /// Read a blob back. Fails with `BlobNotFound` if it is absent.
    async fn get(&self, storage_key: &str) -> Result<Bytes>;

    /// Remove a blob. Succeeds if it is already absent.
    async fn delete(&self, storage_key: &str) -> Result<()>;

    /// Get the storage type name
    fn storage_type(&self) -> &'static str;
}
