//! Ingestion pipeline: validate -> normalize -> stage -> publish.
//!
//! A batch is all-or-nothing. Every file is validated before any is decoded,
//! normalized files are staged outside the public directory, and only when
//! the whole batch has been staged are the files moved into public storage.
//! Persisting rows for the returned descriptors is the caller's job.

use std::sync::Arc;
use std::time::Duration;

use studio_core::UploadConfig;
use studio_storage::{StagingBatch, Storage};

use crate::error::IngestError;
use crate::naming::generate_filename;
use crate::normalizer::{ImageNormalizer, ProcessingError};
use crate::validator::{UploadCandidate, UploadValidator};

/// A published image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImageDescriptor {
    pub original_filename: String,
    pub generated_filename: String,
    /// `{public_prefix}/{generated_filename}`; this is what gets stored in the database
    pub relative_path: String,
    pub public_mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
}

struct PendingImage {
    original_filename: String,
    generated_filename: String,
    width: u32,
    height: u32,
    size_bytes: usize,
}

#[derive(Clone)]
pub struct ImageIngestor {
    storage: Arc<dyn Storage>,
    validator: UploadValidator,
    normalizer: ImageNormalizer,
    per_file_timeout: Duration,
}

impl ImageIngestor {
    pub fn new(
        storage: Arc<dyn Storage>,
        validator: UploadValidator,
        normalizer: ImageNormalizer,
        per_file_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            validator,
            normalizer,
            per_file_timeout,
        }
    }

    pub fn from_config(storage: Arc<dyn Storage>, config: &UploadConfig) -> Self {
        Self::new(
            storage,
            UploadValidator::new(config.max_file_size_bytes, config.max_files_per_request),
            ImageNormalizer::new(config.max_width, config.max_height),
            Duration::from_secs(config.per_file_timeout_secs),
        )
    }

    pub fn validator(&self) -> &UploadValidator {
        &self.validator
    }

    /// Ingest a batch. Descriptors come back in input order.
    ///
    /// On any error nothing from the batch is left in public storage.
    pub async fn ingest(
        &self,
        candidates: Vec<UploadCandidate>,
    ) -> Result<Vec<StoredImageDescriptor>, IngestError> {
        self.validator.validate_batch(&candidates)?;

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let files = candidates.len();
        let budget = self.per_file_timeout.saturating_mul(files as u32);
        let start = std::time::Instant::now();
        let mut batch = StagingBatch::new(self.storage.clone());

        let staged =
            tokio::time::timeout(budget, self.normalize_into(&mut batch, candidates)).await;

        let pending = match staged {
            Ok(Ok(pending)) => pending,
            Ok(Err(e)) => {
                tracing::error!(error = %e, batch_id = %batch.id(), "Image batch failed");
                batch.abort().await;
                return Err(e);
            }
            Err(_) => {
                tracing::error!(
                    batch_id = %batch.id(),
                    files,
                    budget_secs = budget.as_secs(),
                    "Image batch timed out"
                );
                batch.abort().await;
                return Err(IngestError::Timeout {
                    files,
                    budget_secs: budget.as_secs(),
                });
            }
        };

        let stored = batch.commit().await.map_err(|e| IngestError::EncodeOrWrite {
            filename: "batch".to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!(
            files,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image batch published"
        );

        Ok(pending
            .into_iter()
            .zip(stored)
            .map(|(image, object)| StoredImageDescriptor {
                original_filename: image.original_filename,
                generated_filename: image.generated_filename,
                relative_path: object.url,
                public_mime_type: ImageNormalizer::OUTPUT_MIME_TYPE,
                width: image.width,
                height: image.height,
                size_bytes: image.size_bytes,
            })
            .collect())
    }

    /// Files are handled one at a time; decoding and encoding run on the
    /// blocking pool.
    async fn normalize_into(
        &self,
        batch: &mut StagingBatch,
        candidates: Vec<UploadCandidate>,
    ) -> Result<Vec<PendingImage>, IngestError> {
        let mut pending = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let UploadCandidate {
                data,
                original_filename,
                field_name,
                ..
            } = candidate;

            let normalizer = self.normalizer;
            let normalized = tokio::task::spawn_blocking(move || normalizer.normalize(&data))
                .await
                .map_err(|e| IngestError::EncodeOrWrite {
                    filename: original_filename.clone(),
                    reason: format!("processing task failed: {}", e),
                })?
                .map_err(|e| match e {
                    ProcessingError::Decode(reason) => IngestError::Decode {
                        filename: original_filename.clone(),
                        reason,
                    },
                    ProcessingError::Encode(reason) => IngestError::EncodeOrWrite {
                        filename: original_filename.clone(),
                        reason,
                    },
                })?;

            let generated_filename =
                generate_filename(&field_name, ImageNormalizer::OUTPUT_EXTENSION);
            let size_bytes = normalized.data.len();

            batch
                .stage(&generated_filename, normalized.data)
                .await
                .map_err(|e| IngestError::storage(&original_filename, e))?;

            tracing::debug!(
                original_filename = %original_filename,
                generated_filename = %generated_filename,
                source_width = normalized.source_width,
                source_height = normalized.source_height,
                width = normalized.width,
                height = normalized.height,
                "Image staged"
            );

            pending.push(PendingImage {
                original_filename,
                generated_filename,
                width: normalized.width,
                height: normalized.height,
                size_bytes,
            });
        }

        Ok(pending)
    }

    /// Whether `url` points at a file this ingestor published. Such paths
    /// belong to exactly one image row and must not be attached by hand.
    pub fn is_managed_url(&self, url: &str) -> bool {
        self.storage.key_for_url(url).is_some()
    }

    /// Best-effort removal of a published image by its stored path.
    ///
    /// Never fails: a missing file is fine, other failures are logged. Paths
    /// outside the public prefix (external URLs) are left alone.
    pub async fn remove(&self, relative_path: &str) {
        let Some(key) = self.storage.key_for_url(relative_path) else {
            tracing::debug!(path = %relative_path, "Not a managed upload, skipping file removal");
            return;
        };

        if let Err(e) = self.storage.delete(&key).await {
            tracing::warn!(
                error = %e,
                path = %relative_path,
                "Failed to remove image file, continuing"
            );
        }
    }

    pub async fn remove_all<'a, I>(&self, relative_paths: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for path in relative_paths {
            self.remove(path).await;
        }
    }
}
