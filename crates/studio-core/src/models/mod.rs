//! Data models for the application, organized by domain.

mod admin;
mod contact;
mod project;

pub use admin::*;
pub use contact::*;
pub use project::*;
