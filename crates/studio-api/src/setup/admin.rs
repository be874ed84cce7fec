//! Admin account seeding

use anyhow::Result;
use studio_core::Config;
use studio_db::AdminRepository;

use crate::auth::password::hash_password;

/// Create the configured admin account if `ADMIN_PASSWORD` is set and the
/// username is free. An existing account keeps its password.
pub async fn seed_admin(config: &Config, admins: &AdminRepository) -> Result<()> {
    let Some(password) = config.admin_password() else {
        return Ok(());
    };

    let username = config.admin_username();
    if admins.find_by_username(username).await?.is_some() {
        tracing::debug!(username = %username, "Admin account already exists");
        return Ok(());
    }

    let hash = hash_password(password)?;
    if admins.create_if_missing(username, &hash).await? {
        tracing::info!(username = %username, "Admin account created");
    }

    Ok(())
}
