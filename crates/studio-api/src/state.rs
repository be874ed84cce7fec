//! Application state shared by all handlers.

use crate::auth::jwt::JwtService;
use sqlx::PgPool;
use std::sync::Arc;
use studio_core::Config;
use studio_db::{
    AdminRepository, ContactMessageRepository, ProjectImageRepository, ProjectRepository,
};
use studio_processing::ImageIngestor;
use studio_storage::Storage;

/// Database pool and repositories
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub admin_repository: AdminRepository,
    pub project_repository: ProjectRepository,
    pub project_image_repository: ProjectImageRepository,
    pub contact_repository: ContactMessageRepository,
}

impl DbState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            admin_repository: AdminRepository::new(pool.clone()),
            project_repository: ProjectRepository::new(pool.clone()),
            project_image_repository: ProjectImageRepository::new(pool.clone()),
            contact_repository: ContactMessageRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Storage backend and the ingestion pipeline writing into it
#[derive(Clone)]
pub struct MediaState {
    pub storage: Arc<dyn Storage>,
    pub ingestor: ImageIngestor,
}

pub struct AppState {
    pub config: Config,
    pub db: DbState,
    pub media: MediaState,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, storage: Arc<dyn Storage>) -> Self {
        let ingestor = ImageIngestor::from_config(storage.clone(), config.upload());
        let jwt = Arc::new(JwtService::new(
            config.jwt_secret(),
            config.jwt_expiry_hours(),
        ));

        Self {
            db: DbState::new(pool),
            media: MediaState { storage, ingestor },
            jwt,
            config,
        }
    }
}
