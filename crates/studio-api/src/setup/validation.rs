//! Configuration validation

use anyhow::Result;
use studio_core::Config;

/// Checks on top of `Config::validate` that only matter for a running server
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set explicit origins via CORS_ORIGINS."
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.admin_password().is_none() {
        tracing::warn!(
            username = %config.admin_username(),
            "ADMIN_PASSWORD not set; no admin account will be created"
        );
    }

    Ok(())
}
