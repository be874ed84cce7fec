//! Multipart project form parsing.
//!
//! Files are checked against the intake rules as they stream in, so an
//! oversized or non-image part stops the read early. Nothing touches the
//! filesystem here.

use axum::extract::multipart::{Field, Multipart};
use studio_core::{models::ProjectFields, AppError};
use studio_processing::{UploadCandidate, UploadValidator};
use validator::Validate;

use crate::error::HttpAppError;

/// Multipart field carrying image files
pub const IMAGES_FIELD: &str = "images";

const FIELDS_REQUIRED: &str = "All fields are required";

/// Matches the `project_images.image_url` column
const MAX_IMAGE_URL_LEN: usize = 255;

/// A parsed project form
#[derive(Debug, Default)]
pub struct ProjectForm {
    pub fields: ProjectFields,
    /// Already-hosted URLs to attach as-is (`imageUrls`, a JSON array)
    pub image_urls: Vec<String>,
    pub candidates: Vec<UploadCandidate>,
}

impl ProjectForm {
    /// Every text field must be present and non-blank
    pub fn validate_fields(&self) -> Result<(), AppError> {
        self.fields
            .validate()
            .map_err(|_| AppError::InvalidInput(FIELDS_REQUIRED.to_string()))?;

        if !self.fields.slug().chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::InvalidInput(
                "Title must contain at least one letter or digit".to_string(),
            ));
        }
        Ok(())
    }
}

pub async fn read_project_form(
    mut multipart: Multipart,
    validator: &UploadValidator,
) -> Result<ProjectForm, HttpAppError> {
    let mut form = ProjectForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() || name == IMAGES_FIELD {
            if name != IMAGES_FIELD {
                return Err(AppError::BadRequest(format!(
                    "Unexpected file field '{}', send images as '{}'",
                    name, IMAGES_FIELD
                ))
                .into());
            }
            validator.validate_count(form.candidates.len() + 1)?;
            let candidate = read_file(field, validator).await?;
            form.candidates.push(candidate);
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "title" => form.fields.title = value.trim().to_string(),
            "location" => form.fields.location = value.trim().to_string(),
            "completionDate" => form.fields.completion_date = value.trim().to_string(),
            "description" => form.fields.description = value.trim().to_string(),
            "imageUrls" => form.image_urls = parse_image_urls(&value)?,
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// Buffer one file part, failing as soon as it breaks an intake rule
async fn read_file(
    mut field: Field<'_>,
    validator: &UploadValidator,
) -> Result<UploadCandidate, HttpAppError> {
    let field_name = field.name().unwrap_or(IMAGES_FIELD).to_string();
    let original_filename = field.file_name().unwrap_or("unknown").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    validator.validate_content_type(&original_filename, &content_type)?;

    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        data.extend_from_slice(&chunk);
        if data.len() > validator.max_file_size() {
            validator.validate_file_size(&original_filename, data.len())?;
        }
    }
    validator.validate_file_size(&original_filename, data.len())?;

    Ok(UploadCandidate {
        data,
        original_filename,
        content_type,
        field_name,
    })
}

fn parse_image_urls(value: &str) -> Result<Vec<String>, AppError> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }

    let urls: Vec<String> = serde_json::from_str(value).map_err(|_| {
        AppError::InvalidInput("imageUrls must be a JSON array of strings".to_string())
    })?;

    let urls: Vec<String> = urls
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect();

    if urls.iter().any(|url| url.chars().count() > MAX_IMAGE_URL_LEN) {
        return Err(AppError::InvalidInput(format!(
            "imageUrls entries must be at most {} characters",
            MAX_IMAGE_URL_LEN
        )));
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_urls() {
        assert_eq!(
            parse_image_urls(r#"["https://cdn.example.com/a.jpg", " ", "/uploads/b.webp"]"#)
                .unwrap(),
            vec!["https://cdn.example.com/a.jpg", "/uploads/b.webp"]
        );
        assert!(parse_image_urls("").unwrap().is_empty());
        assert!(parse_image_urls("not json").is_err());
        assert!(parse_image_urls(r#"{"url": "x"}"#).is_err());
    }

    #[test]
    fn test_parse_image_urls_rejects_overlong_entries() {
        let long = format!("https://cdn.example.com/{}.jpg", "a".repeat(240));
        let err = parse_image_urls(&serde_json::json!([long]).to_string()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let fits = format!("https://cdn.example.com/{}.jpg", "a".repeat(200));
        assert_eq!(
            parse_image_urls(&serde_json::json!([fits]).to_string())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_validate_fields_rejects_title_without_slug() {
        let form = ProjectForm {
            fields: ProjectFields {
                title: "!!! ???".to_string(),
                location: "Lima".to_string(),
                completion_date: "2024".to_string(),
                description: "Patio house".to_string(),
            },
            ..Default::default()
        };
        let err = form.validate_fields().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(err.to_string().contains("letter or digit"));
    }

    #[test]
    fn test_validate_fields_message() {
        let form = ProjectForm {
            fields: ProjectFields {
                title: "Casa".to_string(),
                location: String::new(),
                completion_date: "2024".to_string(),
                description: "Patio house".to_string(),
            },
            ..Default::default()
        };
        let err = form.validate_fields().unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: All fields are required");
    }
}
