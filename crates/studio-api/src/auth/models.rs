use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims issued at login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // admin id
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authenticated admin, inserted into request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub admin_id: Uuid,
    pub username: String,
}

impl From<JwtClaims> for AdminContext {
    fn from(claims: JwtClaims) -> Self {
        Self {
            admin_id: claims.sub,
            username: claims.username,
        }
    }
}

// Extracted from parts so it can be combined with Multipart
impl<S> FromRequestParts<S> for AdminContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminContext>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        error: "Access token required".to_string(),
                        details: None,
                        error_type: None,
                        code: "MISSING_ADMIN_CONTEXT".to_string(),
                        recoverable: false,
                        suggested_action: Some("Log in and retry with a bearer token".to_string()),
                    }),
                )
            })
    }
}
