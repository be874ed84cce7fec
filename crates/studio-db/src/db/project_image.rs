use sqlx::{PgConnection, PgPool, Postgres};
use studio_core::{models::ProjectImage, AppError};
use uuid::Uuid;

const IMAGE_COLUMNS: &str = "id, project_id, image_url, created_at";

/// Repository for project image rows
#[derive(Clone)]
pub struct ProjectImageRepository {
    pool: PgPool,
}

impl ProjectImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Images of one project, oldest first
    #[tracing::instrument(skip(self), fields(db.table = "project_images", db.operation = "select"))]
    pub async fn list_for_project(&self, project_id: Uuid) -> Result<Vec<ProjectImage>, AppError> {
        let images = sqlx::query_as::<Postgres, ProjectImage>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM project_images WHERE project_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    /// Images of several projects in one query, oldest first
    #[tracing::instrument(skip(self, project_ids), fields(db.table = "project_images", db.operation = "select", db.count = project_ids.len()))]
    pub async fn list_for_projects(
        &self,
        project_ids: &[Uuid],
    ) -> Result<Vec<ProjectImage>, AppError> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        let images = sqlx::query_as::<Postgres, ProjectImage>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM project_images WHERE project_id = ANY($1) ORDER BY created_at ASC, id ASC"
        ))
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    /// Image by id, only if it belongs to `project_id`
    #[tracing::instrument(skip(self), fields(db.table = "project_images", db.operation = "select", db.record_id = %image_id))]
    pub async fn get(
        &self,
        project_id: Uuid,
        image_id: Uuid,
    ) -> Result<Option<ProjectImage>, AppError> {
        let image = sqlx::query_as::<Postgres, ProjectImage>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM project_images WHERE id = $1 AND project_id = $2"
        ))
        .bind(image_id)
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }

    /// Returns whether a row was deleted
    #[tracing::instrument(skip(self), fields(db.table = "project_images", db.operation = "delete", db.record_id = %image_id))]
    pub async fn delete(&self, image_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM project_images WHERE id = $1")
            .bind(image_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Insert image rows on an open connection or transaction, preserving order.
pub(crate) async fn insert_images(
    conn: &mut PgConnection,
    project_id: Uuid,
    image_urls: &[String],
) -> Result<Vec<ProjectImage>, sqlx::Error> {
    let mut images = Vec::with_capacity(image_urls.len());

    // One statement per row keeps created_at strictly ordered within the batch
    for url in image_urls {
        let image = sqlx::query_as::<Postgres, ProjectImage>(&format!(
            "INSERT INTO project_images (id, project_id, image_url, created_at) \
             VALUES ($1, $2, $3, clock_timestamp()) RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(url)
        .fetch_one(&mut *conn)
        .await?;
        images.push(image);
    }

    Ok(images)
}

pub(crate) async fn list_for_project_on(
    conn: &mut PgConnection,
    project_id: Uuid,
) -> Result<Vec<ProjectImage>, sqlx::Error> {
    sqlx::query_as::<Postgres, ProjectImage>(&format!(
        "SELECT {IMAGE_COLUMNS} FROM project_images WHERE project_id = $1 ORDER BY created_at ASC, id ASC"
    ))
    .bind(project_id)
    .fetch_all(conn)
    .await
}
