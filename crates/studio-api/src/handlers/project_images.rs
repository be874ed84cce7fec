use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::models::AdminContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::project_lifecycle::ProjectLifecycleService;
use crate::state::AppState;

/// Remove a single image from a project
#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}/images/{image_id}",
    tag = "projects",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image deleted"),
        (status = 404, description = "Image not found in this project", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(admin_id = %admin.admin_id))]
pub async fn delete_project_image(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    Path((project_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let image = ProjectLifecycleService::from_state(&state)
        .delete_image(project_id, image_id)
        .await?;

    Ok(Json(json!({
        "message": "Image deleted successfully",
        "image_id": image.id,
    })))
}
