//! Route configuration and setup

use crate::auth::middleware::auth_middleware;
use crate::error::expose_error_details;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use studio_core::Config;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes.
///
/// Reads are public; writes require an admin token, except the contact form.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let admin_only = axum::middleware::from_fn_with_state(state.jwt.clone(), auth_middleware);

    let api = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/projects",
            get(handlers::projects::list_projects).merge(
                post(handlers::projects::create_project).route_layer(admin_only.clone()),
            ),
        )
        .route(
            "/api/projects/slug/{slug}",
            get(handlers::projects::get_project_by_slug),
        )
        .route(
            "/api/projects/{id}",
            get(handlers::projects::get_project).merge(
                put(handlers::projects::update_project)
                    .delete(handlers::projects::delete_project)
                    .route_layer(admin_only.clone()),
            ),
        )
        .route(
            "/api/projects/{project_id}/images/{image_id}",
            delete(handlers::project_images::delete_project_image)
                .route_layer(admin_only.clone()),
        )
        .route(
            "/api/contact",
            post(handlers::contact::submit_contact_message).merge(
                get(handlers::contact::list_contact_messages).route_layer(admin_only.clone()),
            ),
        )
        .route(
            "/api/contact/{id}/read",
            put(handlers::contact::mark_contact_message_read).route_layer(admin_only.clone()),
        )
        .route(
            "/api/contact/{id}",
            delete(handlers::contact::delete_contact_message).route_layer(admin_only),
        )
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::ApiDoc::openapi()) }),
        );

    // Error details are read from the config once, here
    let api = if config.is_production() {
        api
    } else {
        api.layer(axum::middleware::map_response(expose_error_details))
    };

    let upload = config.upload();
    let app = api
        .nest_service(&upload.public_prefix, ServeDir::new(&upload.upload_dir))
        // A full upload batch is larger than axum's default limit
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                // Cors needs a `Default` response body; the limit layer's body isn't one
                .layer(MapResponseBodyLayer::new(axum::body::Body::new))
                .layer(RequestBodyLimitLayer::new(config.max_request_body_bytes())),
        )
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
