use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Portfolio project row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub location: String,
    pub completion_date: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Image attached to a project. `image_url` is either `{prefix}/{filename}`
/// for files produced by the upload pipeline or an external URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProjectImage {
    pub id: Uuid,
    pub project_id: Uuid,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectImageResponse {
    pub id: Uuid,
    pub url: String,
}

/// Project with its images, oldest upload first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub location: String,
    #[serde(rename = "completionDate")]
    pub completion_date: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub images: Vec<String>,
    pub image_records: Vec<ProjectImageResponse>,
}

impl Project {
    pub fn into_response(self, images: Vec<ProjectImage>) -> ProjectResponse {
        ProjectResponse {
            id: self.id,
            title: self.title,
            slug: self.slug,
            location: self.location,
            completion_date: self.completion_date,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
            images: images.iter().map(|img| img.image_url.clone()).collect(),
            image_records: images
                .into_iter()
                .map(|img| ProjectImageResponse {
                    id: img.id,
                    url: img.image_url,
                })
                .collect(),
        }
    }
}

/// Text fields of the project form. Every field is required.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct ProjectFields {
    #[validate(length(min = 1, max = 255, message = "All fields are required"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "All fields are required"))]
    pub location: String,
    #[serde(rename = "completionDate")]
    #[validate(length(min = 1, max = 100, message = "All fields are required"))]
    pub completion_date: String,
    #[validate(length(min = 1, message = "All fields are required"))]
    pub description: String,
}

impl ProjectFields {
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }
}

/// Derive a URL slug from a title: lowercase, whitespace runs become `-`,
/// everything outside `[a-z0-9_-]` is dropped.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}
