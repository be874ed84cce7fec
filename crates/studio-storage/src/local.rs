use crate::keys::{key_for_url, url_for_key, validate_key};
use crate::traits::{StagedFile, Storage, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    upload_dir: PathBuf,
    staging_dir: PathBuf,
    public_prefix: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating both directories if absent.
    ///
    /// # Arguments
    /// * `upload_dir` - Public directory served under `public_prefix` (e.g. "public/uploads")
    /// * `staging_dir` - Private directory for in-flight batches. Must be on the
    ///   same filesystem as `upload_dir` so promotion is a hard link.
    /// * `public_prefix` - URL prefix for served files (e.g. "/uploads")
    pub async fn new(
        upload_dir: impl Into<PathBuf>,
        staging_dir: impl Into<PathBuf>,
        public_prefix: impl Into<String>,
    ) -> StorageResult<Self> {
        let upload_dir = upload_dir.into();
        let staging_dir = staging_dir.into();

        for dir in [&upload_dir, &staging_dir] {
            fs::create_dir_all(dir).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(LocalStorage {
            upload_dir,
            staging_dir,
            public_prefix: public_prefix.into(),
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.upload_dir.join(key))
    }

    fn batch_dir(&self, batch_id: Uuid) -> PathBuf {
        self.staging_dir.join(batch_id.to_string())
    }

    fn staged_path(&self, batch_id: Uuid, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.batch_dir(batch_id).join(key))
    }

    async fn write_synced(path: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn stage(&self, batch_id: Uuid, key: &str, data: Vec<u8>) -> StorageResult<StagedFile> {
        let path = self.staged_path(batch_id, key)?;
        let size = data.len();
        let start = std::time::Instant::now();

        fs::create_dir_all(self.batch_dir(batch_id)).await?;
        Self::write_synced(&path, &data).await?;

        tracing::debug!(
            path = %path.display(),
            key = %key,
            batch_id = %batch_id,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Staged file written"
        );

        Ok(StagedFile {
            batch_id,
            key: key.to_string(),
            size_bytes: size,
        })
    }

    async fn promote(&self, staged: &StagedFile) -> StorageResult<StoredObject> {
        let from = self.staged_path(staged.batch_id, &staged.key)?;
        let to = self.key_to_path(&staged.key)?;
        let start = std::time::Instant::now();

        // The upload directory may have been removed while the server was running
        fs::create_dir_all(&self.upload_dir).await?;

        // hard_link fails with AlreadyExists instead of replacing the target
        match fs::hard_link(&from, &to).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StorageError::UploadFailed(format!(
                    "Refusing to overwrite existing file {}",
                    to.display()
                )));
            }
            Err(e) => {
                return Err(StorageError::UploadFailed(format!(
                    "Failed to link {} to {}: {}",
                    from.display(),
                    to.display(),
                    e
                )));
            }
        }

        if let Err(e) = fs::remove_file(&from).await {
            tracing::debug!(
                error = %e,
                path = %from.display(),
                "Staged file left behind after promotion"
            );
        }

        let url = url_for_key(&self.public_prefix, &staged.key);

        tracing::info!(
            path = %to.display(),
            key = %staged.key,
            size_bytes = staged.size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredObject {
            key: staged.key.clone(),
            url,
        })
    }

    async fn discard_batch(&self, batch_id: Uuid) -> StorageResult<()> {
        let dir = self.batch_dir(batch_id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::debug!(batch_id = %batch_id, "Discarded staged batch");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to discard staging directory {}: {}",
                dir.display(),
                e
            ))),
        }
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage delete successful"
                );
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(key = %key, "File already absent");
                Ok(())
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn public_url(&self, key: &str) -> String {
        url_for_key(&self.public_prefix, key)
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        key_for_url(&self.public_prefix, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir.join("uploads"), dir.join(".staging"), "/uploads")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_new_creates_directories() {
        let dir = tempdir().unwrap();
        let _ = storage(dir.path()).await;
        assert!(dir.path().join("uploads").is_dir());
        assert!(dir.path().join(".staging").is_dir());
    }

    #[tokio::test]
    async fn test_stage_is_not_public_until_promoted() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let batch = Uuid::new_v4();

        let staged = storage
            .stage(batch, "images-1-1.webp", b"webp bytes".to_vec())
            .await
            .unwrap();
        assert!(!storage.exists("images-1-1.webp").await.unwrap());

        let stored = storage.promote(&staged).await.unwrap();
        assert_eq!(stored.url, "/uploads/images-1-1.webp");
        assert_eq!(
            storage.download("images-1-1.webp").await.unwrap(),
            b"webp bytes".to_vec()
        );
    }

    #[tokio::test]
    async fn test_discard_batch_removes_staged_files() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let batch = Uuid::new_v4();

        storage.stage(batch, "a.webp", vec![1]).await.unwrap();
        storage.discard_batch(batch).await.unwrap();

        assert!(!dir.path().join(".staging").join(batch.to_string()).exists());
        // Discarding twice is fine
        storage.discard_batch(batch).await.unwrap();
    }

    #[tokio::test]
    async fn test_promote_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let first = storage.stage(Uuid::new_v4(), "same.webp", vec![1]).await.unwrap();
        storage.promote(&first).await.unwrap();

        let second = storage.stage(Uuid::new_v4(), "same.webp", vec![2]).await.unwrap();
        let result = storage.promote(&second).await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert_eq!(storage.download("same.webp").await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_concurrent_promotions_of_same_key_keep_one_file() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let first = storage.stage(Uuid::new_v4(), "race.webp", vec![1]).await.unwrap();
        let second = storage.stage(Uuid::new_v4(), "race.webp", vec![2]).await.unwrap();

        let (a, b) = tokio::join!(storage.promote(&first), storage.promote(&second));
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);

        let winner = if a.is_ok() { vec![1] } else { vec![2] };
        assert_eq!(storage.download("race.webp").await.unwrap(), winner);
    }

    #[tokio::test]
    async fn test_promote_clears_staged_copy() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let batch = Uuid::new_v4();

        let staged = storage.stage(batch, "moved.webp", vec![3]).await.unwrap();
        storage.promote(&staged).await.unwrap();

        assert!(!dir
            .path()
            .join(".staging")
            .join(batch.to_string())
            .join("moved.webp")
            .exists());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let staged = storage.stage(Uuid::new_v4(), "gone.webp", vec![0]).await.unwrap();
        storage.promote(&staged).await.unwrap();

        storage.delete("gone.webp").await.unwrap();
        storage.delete("gone.webp").await.unwrap();
        assert!(!storage.exists("gone.webp").await.unwrap());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.download("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.stage(Uuid::new_v4(), "../escape.webp", vec![]).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let result = storage.download("missing.webp").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_url_mapping() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        assert_eq!(storage.public_url("x.webp"), "/uploads/x.webp");
        assert_eq!(storage.key_for_url("/uploads/x.webp").as_deref(), Some("x.webp"));
        assert_eq!(storage.key_for_url("https://example.com/x.webp"), None);
    }
}
