//! All-or-nothing publication of a group of files.

use crate::traits::{StagedFile, Storage, StorageResult, StoredObject};
use std::sync::Arc;
use uuid::Uuid;

/// Files staged together and published together.
///
/// Nothing is visible under the public prefix until [`StagingBatch::commit`]
/// succeeds. A batch that is dropped without being committed or aborted keeps
/// its staged files on disk; callers must finish with `commit` or `abort`.
pub struct StagingBatch {
    storage: Arc<dyn Storage>,
    id: Uuid,
    staged: Vec<StagedFile>,
}

impl StagingBatch {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            id: Uuid::new_v4(),
            staged: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub async fn stage(&mut self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let staged = self.storage.stage(self.id, key, data).await?;
        self.staged.push(staged);
        Ok(())
    }

    /// Promote every staged file, in staging order.
    ///
    /// If a promotion fails, files already promoted by this call are deleted
    /// again (best-effort) and the remaining staged files are discarded.
    pub async fn commit(self) -> StorageResult<Vec<StoredObject>> {
        let mut stored = Vec::with_capacity(self.staged.len());

        for staged in &self.staged {
            match self.storage.promote(staged).await {
                Ok(object) => stored.push(object),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        batch_id = %self.id,
                        key = %staged.key,
                        promoted = stored.len(),
                        "Failed to promote staged file, rolling back batch"
                    );
                    for object in &stored {
                        if let Err(cleanup) = self.storage.delete(&object.key).await {
                            tracing::warn!(
                                error = %cleanup,
                                key = %object.key,
                                "Failed to remove promoted file during rollback"
                            );
                        }
                    }
                    self.discard().await;
                    return Err(e);
                }
            }
        }

        self.discard().await;
        Ok(stored)
    }

    /// Drop every staged file without publishing anything
    pub async fn abort(self) {
        self.discard().await;
    }

    async fn discard(&self) {
        if let Err(e) = self.storage.discard_batch(self.id).await {
            tracing::warn!(error = %e, batch_id = %self.id, "Failed to clean staging directory");
        }
    }
}
