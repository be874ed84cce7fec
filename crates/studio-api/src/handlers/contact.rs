use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use studio_core::{
    models::{ContactMessage, CreateContactMessageRequest},
    AppError,
};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::auth::models::AdminContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Public contact form submission
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "contact",
    request_body = CreateContactMessageRequest,
    responses(
        (status = 201, description = "Message stored"),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn submit_contact_message(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateContactMessageRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request
        .validate()
        .map_err(|errors| AppError::InvalidInput(first_message(&errors)))?;

    let message = state.db.contact_repository.create(&request).await?;
    tracing::info!(message_id = %message.id, "Contact message received");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Message sent successfully",
            "id": message.id,
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/contact",
    tag = "contact",
    responses(
        (status = 200, description = "All messages, newest first", body = Vec<ContactMessage>),
        (status = 401, description = "Missing token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _admin))]
pub async fn list_contact_messages(
    State(state): State<Arc<AppState>>,
    _admin: AdminContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let messages = state.db.contact_repository.list().await?;
    Ok(Json(messages))
}

#[utoipa::path(
    put,
    path = "/api/contact/{id}/read",
    tag = "contact",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Marked as read"),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _admin))]
pub async fn mark_contact_message_read(
    State(state): State<Arc<AppState>>,
    _admin: AdminContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.contact_repository.mark_read(id).await? {
        return Err(AppError::NotFound("Message not found".to_string()).into());
    }
    Ok(Json(json!({ "message": "Message marked as read" })))
}

#[utoipa::path(
    delete,
    path = "/api/contact/{id}",
    tag = "contact",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message deleted"),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _admin))]
pub async fn delete_contact_message(
    State(state): State<Arc<AppState>>,
    _admin: AdminContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.contact_repository.delete(id).await? {
        return Err(AppError::NotFound("Message not found".to_string()).into());
    }
    Ok(Json(json!({ "message": "Message deleted successfully" })))
}

/// The first field message, e.g. "Email is required"
fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid contact message".to_string())
}
