//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use studio_core::Config;
use studio_storage::{create_storage, Storage};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let upload = config.upload();
    let storage = create_storage(upload)
        .await
        .with_context(|| format!("Failed to prepare {}", upload.upload_dir.display()))?;

    tracing::info!(
        max_file_mb = upload.max_file_size_bytes / 1024 / 1024,
        max_files = upload.max_files_per_request,
        max_width = upload.max_width,
        max_height = upload.max_height,
        "Image uploads enabled"
    );

    Ok(storage)
}
