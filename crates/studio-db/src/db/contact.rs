use sqlx::{PgPool, Postgres};
use studio_core::{
    models::{ContactMessage, CreateContactMessageRequest},
    AppError,
};
use uuid::Uuid;

const MESSAGE_COLUMNS: &str = "id, name, email, phone, subject, message, is_read, created_at";

/// Repository for contact form submissions
#[derive(Clone)]
pub struct ContactMessageRepository {
    pool: PgPool,
}

impl ContactMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "contact_messages", db.operation = "insert"))]
    pub async fn create(
        &self,
        request: &CreateContactMessageRequest,
    ) -> Result<ContactMessage, AppError> {
        let message = sqlx::query_as::<Postgres, ContactMessage>(&format!(
            r#"
            INSERT INTO contact_messages (id, name, email, phone, subject, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(request.name.trim())
        .bind(request.email.trim())
        .bind(request.normalized_phone())
        .bind(request.subject.trim())
        .bind(&request.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// All messages, newest first
    #[tracing::instrument(skip(self), fields(db.table = "contact_messages", db.operation = "select"))]
    pub async fn list(&self) -> Result<Vec<ContactMessage>, AppError> {
        let messages = sqlx::query_as::<Postgres, ContactMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM contact_messages ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Returns whether the message exists
    #[tracing::instrument(skip(self), fields(db.table = "contact_messages", db.operation = "update", db.record_id = %id))]
    pub async fn mark_read(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE contact_messages SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns whether a row was deleted
    #[tracing::instrument(skip(self), fields(db.table = "contact_messages", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
