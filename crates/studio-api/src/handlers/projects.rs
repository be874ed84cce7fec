use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use studio_core::{
    models::{ProjectImage, ProjectResponse},
    AppError,
};
use uuid::Uuid;

use crate::auth::models::AdminContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::project_lifecycle::ProjectLifecycleService;
use crate::services::upload::read_project_form;
use crate::state::AppState;

/// List projects, newest first
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    responses(
        (status = 200, description = "All projects", body = Vec<ProjectResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let projects = state.db.project_repository.list().await?;
    let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
    let images = state
        .db
        .project_image_repository
        .list_for_projects(&ids)
        .await?;

    let mut by_project: HashMap<Uuid, Vec<ProjectImage>> = HashMap::new();
    for image in images {
        by_project.entry(image.project_id).or_default().push(image);
    }

    let response: Vec<ProjectResponse> = projects
        .into_iter()
        .map(|project| {
            let images = by_project.remove(&project.id).unwrap_or_default();
            project.into_response(images)
        })
        .collect();

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project found", body = ProjectResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let project = state
        .db
        .project_repository
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    let images = state
        .db
        .project_image_repository
        .list_for_project(project.id)
        .await?;

    Ok(Json(project.into_response(images)))
}

#[utoipa::path(
    get,
    path = "/api/projects/slug/{slug}",
    tag = "projects",
    params(("slug" = String, Path, description = "Project slug")),
    responses(
        (status = 200, description = "Project found", body = ProjectResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_project_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let project = state
        .db
        .project_repository
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    let images = state
        .db
        .project_image_repository
        .list_for_project(project.id)
        .await?;

    Ok(Json(project.into_response(images)))
}

/// Create a project from a multipart form.
///
/// Text fields `title`, `location`, `completionDate` and `description` are
/// required. Files go in `images` (at most 10, images only, 10 MiB each) and
/// are stored as WebP. `imageUrls` may carry a JSON array of hosted URLs.
/// A rejected batch writes nothing.
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "projects",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Missing fields or rejected upload", body = ErrorResponse),
        (status = 401, description = "Missing token", body = ErrorResponse),
        (status = 403, description = "Invalid token", body = ErrorResponse),
        (status = 409, description = "Duplicate slug", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Failed to process uploaded images", body = ErrorResponse),
        (status = 504, description = "Image processing timed out", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(admin_id = %admin.admin_id))]
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_project_form(multipart, state.media.ingestor.validator()).await?;
    let project = ProjectLifecycleService::from_state(&state)
        .create(form)
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// Update a project's fields and append uploaded images
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Missing fields or rejected upload", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 409, description = "Duplicate slug", body = ErrorResponse),
        (status = 500, description = "Failed to process uploaded images", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(admin_id = %admin.admin_id))]
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_project_form(multipart, state.media.ingestor.validator()).await?;
    let project = ProjectLifecycleService::from_state(&state)
        .update(id, form)
        .await?;

    Ok(Json(project))
}

/// Delete a project, its image files and its image rows.
///
/// Image files that are already gone do not fail the request.
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deleted"),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(admin_id = %admin.admin_id))]
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ProjectLifecycleService::from_state(&state)
        .delete(id)
        .await?;

    Ok(Json(json!({ "message": "Project deleted successfully" })))
}
