use crate::{LocalStorage, Storage, StorageResult};
use std::sync::Arc;
use studio_core::UploadConfig;

/// Create the storage backend described by the upload configuration
pub async fn create_storage(config: &UploadConfig) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(
        config.upload_dir.clone(),
        config.staging_dir.clone(),
        config.public_prefix.clone(),
    )
    .await?;

    tracing::info!(
        upload_dir = %config.upload_dir.display(),
        staging_dir = %config.staging_dir.display(),
        public_prefix = %config.public_prefix,
        "Local storage initialized"
    );

    Ok(Arc::new(storage))
}
