use crate::validator::ValidationError;
use studio_storage::StorageError;

/// Failure of an ingestion batch. Any variant means nothing from the batch
/// was published.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to decode {filename}: {reason}")]
    Decode { filename: String, reason: String },

    #[error("Failed to encode or store {filename}: {reason}")]
    EncodeOrWrite { filename: String, reason: String },

    #[error("Processing {files} file(s) exceeded the {budget_secs}s budget")]
    Timeout { files: usize, budget_secs: u64 },
}

impl IngestError {
    pub(crate) fn storage(filename: &str, err: StorageError) -> Self {
        IngestError::EncodeOrWrite {
            filename: filename.to_string(),
            reason: err.to_string(),
        }
    }

    /// Client-side mistakes, as opposed to server-side processing failures
    pub fn is_client_error(&self) -> bool {
        matches!(self, IngestError::Validation(_))
    }
}
