use crate::auth::jwt::JwtService;
use crate::auth::models::AdminContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use studio_core::AppError;

/// Requires `Authorization: Bearer <token>`.
///
/// A missing header is 401; a malformed, forged or expired token is 403.
pub async fn auth_middleware(
    State(jwt): State<Arc<JwtService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        Some(token) => token.to_string(),
        None => {
            tracing::debug!("Rejected request without bearer token");
            return HttpAppError(AppError::Unauthorized(
                "Access token required".to_string(),
            ))
            .into_response();
        }
    };

    match jwt.verify(&token) {
        Ok(claims) => {
            let context = AdminContext::from(claims);
            tracing::debug!(admin_id = %context.admin_id, "Admin authenticated");
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected invalid token");
            HttpAppError(AppError::Forbidden(
                "Invalid or expired token".to_string(),
            ))
            .into_response()
        }
    }
}
