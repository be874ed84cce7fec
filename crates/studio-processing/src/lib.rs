//! Studio Processing Library
//!
//! The image ingestion pipeline: upload intake validation, normalization of
//! every accepted image to bounded lossless WebP, and publication through
//! `studio-storage`. Also the best-effort inverse used when images are deleted.

pub mod error;
pub mod naming;
pub mod normalizer;
pub mod pipeline;
pub mod validator;

pub use error::IngestError;
pub use naming::generate_filename;
pub use normalizer::{ImageNormalizer, NormalizedImage, ProcessingError};
pub use pipeline::{ImageIngestor, StoredImageDescriptor};
pub use validator::{UploadCandidate, UploadValidator, ValidationError};
