//! Studio Storage Library
//!
//! Storage abstraction for uploaded project images and its local filesystem
//! implementation.
//!
//! # Layout
//!
//! Keys are flat file names. A key `k` is public at `{upload_dir}/k` and
//! served at `{public_prefix}/k`. Files of an in-flight batch live in
//! `{staging_dir}/{batch_id}/k` until the batch is committed; staging is never
//! served.
//!
//! Keys must not be empty or contain `..`, `/` or `\`.

pub mod batch;
pub mod factory;
pub(crate) mod keys;
pub mod local;
pub mod traits;

pub use batch::StagingBatch;
pub use factory::create_storage;
pub use local::LocalStorage;
pub use traits::{StagedFile, Storage, StorageError, StorageResult, StoredObject};
