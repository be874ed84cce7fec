//! Storage abstraction trait
//!
//! Writes go through a two-step protocol: a file is first staged under a batch
//! id, then promoted into public storage. Staged files are invisible to the
//! static file server, so a batch that fails halfway never exposes a partial
//! set of files.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file written to the staging area of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub batch_id: Uuid,
    pub key: String,
    pub size_bytes: usize,
}

/// A file visible in public storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    /// Path under the public prefix, e.g. `/uploads/{key}`
    pub url: String,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` to the staging area of `batch_id` under `key`
    async fn stage(&self, batch_id: Uuid, key: &str, data: Vec<u8>) -> StorageResult<StagedFile>;

    /// Move a staged file into public storage. Never overwrites an existing key.
    async fn promote(&self, staged: &StagedFile) -> StorageResult<StoredObject>;

    /// Remove everything still staged for `batch_id`. Missing batches are not an error.
    async fn discard_batch(&self, batch_id: Uuid) -> StorageResult<()>;

    /// Read a public file
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a public file. Deleting a missing file succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Public URL for a key
    fn public_url(&self, key: &str) -> String;

    /// Inverse of `public_url`. `None` when the URL does not point into this storage.
    fn key_for_url(&self, url: &str) -> Option<String>;
}
