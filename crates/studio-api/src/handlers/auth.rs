use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use studio_core::{
    models::{AdminSummary, LoginRequest, LoginResponse},
    AppError,
};
use validator::Validate;

use crate::auth::password::verify_password;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Exchange admin credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing username or password", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(|_| {
        AppError::InvalidInput("Username and password are required".to_string())
    })?;

    let admin = state
        .db
        .admin_repository
        .find_by_username(&request.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(&request.password, &admin.password_hash)? {
        tracing::info!("Login rejected: wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
    }

    let token = state.jwt.issue(&admin)?;
    tracing::info!(admin_id = %admin.id, "Admin logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        admin: AdminSummary::from(&admin),
    }))
}
