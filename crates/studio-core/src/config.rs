//! Configuration module
//!
//! Everything the service needs is read once at startup into a `Config` value
//! and handed to components explicitly. Nothing reads the environment later.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;
const SERVER_PORT: u16 = 3001;

const MAX_FILE_SIZE_MB: usize = 10;
const MAX_FILES_PER_REQUEST: usize = 10;
const IMAGE_MAX_WIDTH: u32 = 1920;
const IMAGE_MAX_HEIGHT: u32 = 1080;
const PER_FILE_TIMEOUT_SECS: u64 = 30;
const UPLOAD_DIR: &str = "public/uploads";
const UPLOAD_STAGING_DIR: &str = "public/.staging";
const PUBLIC_UPLOAD_PREFIX: &str = "/uploads";

/// Server, database and auth settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub environment: String,
}

/// Image ingestion settings
#[derive(Clone, Debug)]
pub struct UploadConfig {
    /// Public directory the static server exposes under `public_prefix`
    pub upload_dir: PathBuf,
    /// Batches are written here first and linked into `upload_dir` on success
    pub staging_dir: PathBuf,
    pub public_prefix: String,
    pub max_file_size_bytes: usize,
    pub max_files_per_request: usize,
    pub max_width: u32,
    pub max_height: u32,
    pub per_file_timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(UPLOAD_DIR),
            staging_dir: PathBuf::from(UPLOAD_STAGING_DIR),
            public_prefix: PUBLIC_UPLOAD_PREFIX.to_string(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            max_files_per_request: MAX_FILES_PER_REQUEST,
            max_width: IMAGE_MAX_WIDTH,
            max_height: IMAGE_MAX_HEIGHT,
            per_file_timeout_secs: PER_FILE_TIMEOUT_SECS,
        }
    }
}

#[derive(Clone, Debug)]
pub struct StudioConfig {
    pub base: BaseConfig,
    pub database_url: String,
    pub upload: UploadConfig,
    pub admin_username: String,
    /// When set, the admin account is created at startup if missing
    pub admin_password: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Config(pub Box<StudioConfig>);

impl Config {
    fn as_studio(&self) -> &StudioConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_studio().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = StudioConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_studio().validate()
    }

    pub fn server_host(&self) -> &str {
        &self.as_studio().base.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.as_studio().base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_studio().base.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.as_studio().base.jwt_expiry_hours
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_studio().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_studio().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.as_studio().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_studio().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_studio().base.db_timeout_seconds
    }

    pub fn upload(&self) -> &UploadConfig {
        &self.as_studio().upload
    }

    pub fn admin_username(&self) -> &str {
        &self.as_studio().admin_username
    }

    pub fn admin_password(&self) -> Option<&str> {
        self.as_studio().admin_password.as_deref()
    }

    /// Largest request body the upload routes accept: a full batch plus room for text fields.
    pub fn max_request_body_bytes(&self) -> usize {
        let upload = self.upload();
        upload
            .max_files_per_request
            .saturating_mul(upload.max_file_size_bytes)
            .saturating_add(1024 * 1024)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl StudioConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .or_else(|_| env::var("PORT"))
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_expiry_hours: env_or("JWT_EXPIRY_HOURS", JWT_EXPIRY_HOURS),
            environment,
        };

        let upload = UploadConfig {
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(UPLOAD_DIR)),
            staging_dir: env::var("UPLOAD_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(UPLOAD_STAGING_DIR)),
            public_prefix: env::var("PUBLIC_UPLOAD_PREFIX")
                .map(|p| p.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| PUBLIC_UPLOAD_PREFIX.to_string()),
            max_file_size_bytes: env_or("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB) * 1024 * 1024,
            max_files_per_request: env_or("MAX_FILES_PER_REQUEST", MAX_FILES_PER_REQUEST),
            max_width: env_or("IMAGE_MAX_WIDTH", IMAGE_MAX_WIDTH),
            max_height: env_or("IMAGE_MAX_HEIGHT", IMAGE_MAX_HEIGHT),
            per_file_timeout_secs: env_or("PER_FILE_TIMEOUT_SECS", PER_FILE_TIMEOUT_SECS),
        };

        Ok(Self {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            upload,
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty()),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        let upload = &self.upload;
        if upload.max_file_size_bytes == 0 || upload.max_files_per_request == 0 {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB and MAX_FILES_PER_REQUEST must be greater than zero"
            ));
        }

        if upload.max_width == 0 || upload.max_height == 0 {
            return Err(anyhow::anyhow!(
                "IMAGE_MAX_WIDTH and IMAGE_MAX_HEIGHT must be greater than zero"
            ));
        }

        if upload.per_file_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "PER_FILE_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if upload.staging_dir == upload.upload_dir {
            return Err(anyhow::anyhow!(
                "UPLOAD_STAGING_DIR must differ from UPLOAD_DIR"
            ));
        }

        if !upload.public_prefix.starts_with('/') {
            return Err(anyhow::anyhow!("PUBLIC_UPLOAD_PREFIX must start with '/'"));
        }

        if self.base.jwt_expiry_hours <= 0 {
            return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }

        Ok(())
    }
}
