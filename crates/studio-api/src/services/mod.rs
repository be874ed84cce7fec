pub mod project_lifecycle;
pub mod upload;
