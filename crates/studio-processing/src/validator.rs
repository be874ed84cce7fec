//! Upload intake: the checks a batch must pass before any decoding happens.

/// Declared content types must start with this to be accepted
pub const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

/// A file buffer received in a request, not yet validated or persisted
#[derive(Clone, Debug)]
pub struct UploadCandidate {
    pub data: Vec<u8>,
    pub original_filename: String,
    pub content_type: String,
    /// Multipart field the file arrived in; becomes the generated filename prefix
    pub field_name: String,
}

/// Upload intake validation errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Too many files: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("File {filename} is too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge {
        filename: String,
        size: usize,
        max: usize,
    },

    #[error("Only image files are allowed ({filename} was declared as {content_type})")]
    InvalidContentType {
        filename: String,
        content_type: String,
    },

    #[error("File {0} is empty")]
    EmptyFile(String),
}

/// Upload intake validator
#[derive(Clone, Debug)]
pub struct UploadValidator {
    max_file_size: usize,
    max_files: usize,
}

impl UploadValidator {
    pub fn new(max_file_size: usize, max_files: usize) -> Self {
        Self {
            max_file_size,
            max_files,
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn validate_count(&self, count: usize) -> Result<(), ValidationError> {
        if count > self.max_files {
            return Err(ValidationError::TooManyFiles {
                count,
                max: self.max_files,
            });
        }
        Ok(())
    }

    pub fn validate_file_size(&self, filename: &str, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile(filename.to_string()));
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                filename: filename.to_string(),
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// The declared type is trusted only as far as its `image/` prefix; decoding
    /// decides whether the bytes really are an image.
    pub fn validate_content_type(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<(), ValidationError> {
        let normalized = content_type.trim().to_ascii_lowercase();
        if !normalized.starts_with(IMAGE_CONTENT_TYPE_PREFIX) {
            return Err(ValidationError::InvalidContentType {
                filename: filename.to_string(),
                content_type: content_type.to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_candidate(&self, candidate: &UploadCandidate) -> Result<(), ValidationError> {
        self.validate_content_type(&candidate.original_filename, &candidate.content_type)?;
        self.validate_file_size(&candidate.original_filename, candidate.data.len())
    }

    /// Validate a whole batch. The first failing file rejects the batch.
    pub fn validate_batch(&self, candidates: &[UploadCandidate]) -> Result<(), ValidationError> {
        self.validate_count(candidates.len())?;
        candidates
            .iter()
            .try_for_each(|candidate| self.validate_candidate(candidate))
    }
}
