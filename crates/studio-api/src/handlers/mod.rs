pub mod auth;
pub mod contact;
pub mod health;
pub mod project_images;
pub mod projects;
