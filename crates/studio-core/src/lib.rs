//! Studio Core Library
//!
//! Domain models, error types and configuration shared by the studio crates.

pub mod config;
pub mod error;
pub mod models;

pub use config::{BaseConfig, Config, StudioConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
