//! Database repositories for data access layer
//!
//! Each repository owns a `PgPool` handle and covers one table. Image rows
//! are written together with their project through [`transaction`].

mod admin;
mod contact;
mod project;
mod project_image;
pub mod transaction;

pub use admin::AdminRepository;
pub use contact::ContactMessageRepository;
pub use project::ProjectRepository;
pub use project_image::ProjectImageRepository;
pub use transaction::with_transaction;

use studio_core::AppError;

/// Map a unique-constraint violation to `Conflict`, everything else to `Database`
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> AppError {
    let is_unique = err
        .as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false);
    if is_unique {
        AppError::Conflict(message.to_string())
    } else {
        AppError::Database(err)
    }
}
