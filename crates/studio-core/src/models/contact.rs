use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Message submitted through the public contact form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateContactMessageRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(
        email(message = "A valid email address is required"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Subject is required"))]
    pub subject: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

impl CreateContactMessageRequest {
    /// Blank phone numbers are stored as NULL
    pub fn normalized_phone(&self) -> Option<String> {
        self.phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateContactMessageRequest {
        CreateContactMessageRequest {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: Some("  ".to_string()),
            subject: "New house".to_string(),
            message: "We would like a quote".to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_missing_subject_rejected() {
        let mut req = request();
        req.subject = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut req = request();
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blank_phone_normalized_to_none() {
        assert_eq!(request().normalized_phone(), None);
    }
}
