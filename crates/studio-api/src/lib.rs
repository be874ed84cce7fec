//! Studio API
//!
//! HTTP surface of the studio backend: admin login, projects with image
//! uploads, the contact form, static serving of uploaded images and startup
//! wiring. The binary in `main.rs` only loads configuration and calls
//! [`setup::initialize_app`].

pub mod api_doc;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
