use sqlx::{PgConnection, PgPool, Postgres};
use studio_core::{
    models::{Project, ProjectFields, ProjectImage},
    AppError,
};
use uuid::Uuid;

use super::map_unique_violation;
use super::project_image::{insert_images, list_for_project_on};
use super::transaction::with_transaction;

const PROJECT_COLUMNS: &str =
    "id, title, slug, location, completion_date, description, created_at, updated_at";
const DUPLICATE_SLUG: &str = "A project with this title already exists";

/// Repository for portfolio projects
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a project and its image rows in one transaction
    #[tracing::instrument(skip(self, fields, image_urls), fields(db.table = "projects", db.operation = "insert", images = image_urls.len()))]
    pub async fn create_with_images(
        &self,
        fields: ProjectFields,
        image_urls: Vec<String>,
    ) -> Result<(Project, Vec<ProjectImage>), AppError> {
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let project = insert_project(&mut **tx, &fields).await?;
                let images = insert_images(&mut **tx, project.id, &image_urls).await?;
                Ok((project, images))
            })
        })
        .await
    }

    /// Update a project's fields and append image rows in one transaction.
    ///
    /// Returns `None` when the project does not exist. The returned images are
    /// all images of the project, old and new.
    #[tracing::instrument(skip(self, fields, new_image_urls), fields(db.table = "projects", db.operation = "update", db.record_id = %id, images = new_image_urls.len()))]
    pub async fn update_with_images(
        &self,
        id: Uuid,
        fields: ProjectFields,
        new_image_urls: Vec<String>,
    ) -> Result<Option<(Project, Vec<ProjectImage>)>, AppError> {
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let Some(project) = update_project(&mut **tx, id, &fields).await? else {
                    return Ok(None);
                };
                insert_images(&mut **tx, project.id, &new_image_urls).await?;
                let images = list_for_project_on(&mut **tx, project.id).await?;
                Ok(Some((project, images)))
            })
        })
        .await
    }

    /// All projects, newest first
    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "select"))]
    pub async fn list(&self) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<Postgres, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "select"))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    /// Delete a project; its image rows go with it (ON DELETE CASCADE).
    /// Returns whether a row was deleted.
    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn insert_project(
    conn: &mut PgConnection,
    fields: &ProjectFields,
) -> Result<Project, AppError> {
    sqlx::query_as::<Postgres, Project>(&format!(
        r#"
        INSERT INTO projects (id, title, slug, location, completion_date, description)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&fields.title)
    .bind(fields.slug())
    .bind(&fields.location)
    .bind(&fields.completion_date)
    .bind(&fields.description)
    .fetch_one(conn)
    .await
    .map_err(|e| map_unique_violation(e, DUPLICATE_SLUG))
}

async fn update_project(
    conn: &mut PgConnection,
    id: Uuid,
    fields: &ProjectFields,
) -> Result<Option<Project>, AppError> {
    sqlx::query_as::<Postgres, Project>(&format!(
        r#"
        UPDATE projects
        SET title = $2, slug = $3, location = $4, completion_date = $5,
            description = $6, updated_at = NOW()
        WHERE id = $1
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&fields.title)
    .bind(fields.slug())
    .bind(&fields.location)
    .bind(&fields.completion_date)
    .bind(&fields.description)
    .fetch_optional(conn)
    .await
    .map_err(|e| map_unique_violation(e, DUPLICATE_SLUG))
}
