//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use studio_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Studio API",
        version = "0.1.0",
        description = "Backend of the studio website: portfolio projects with their images, the contact form and admin login. Uploaded images are stored as lossless WebP no larger than the configured bounding box and served under the public uploads prefix."
    ),
    paths(
        handlers::auth::login,
        handlers::projects::list_projects,
        handlers::projects::get_project,
        handlers::projects::get_project_by_slug,
        handlers::projects::create_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::project_images::delete_project_image,
        handlers::contact::submit_contact_message,
        handlers::contact::list_contact_messages,
        handlers::contact::mark_contact_message_read,
        handlers::contact::delete_contact_message,
        handlers::health::health_check,
    ),
    components(schemas(
        error::ErrorResponse,
        models::LoginRequest,
        models::LoginResponse,
        models::AdminSummary,
        models::ProjectResponse,
        models::ProjectImageResponse,
        models::ContactMessage,
        models::CreateContactMessageRequest,
        handlers::health::HealthCheckResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Admin login"),
        (name = "projects", description = "Portfolio projects and their images"),
        (name = "contact", description = "Contact form messages"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_project_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/projects",
            "/api/projects/{id}",
            "/api/projects/slug/{slug}",
            "/api/projects/{project_id}/images/{image_id}",
            "/api/contact",
            "/api/auth/login",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
