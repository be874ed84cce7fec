//! Key validation and key <-> public URL mapping.

use crate::traits::{StorageError, StorageResult};

pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key.contains("..")
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0')
    {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {:?}",
            key
        )));
    }
    Ok(())
}

pub(crate) fn url_for_key(public_prefix: &str, key: &str) -> String {
    format!("{}/{}", public_prefix.trim_end_matches('/'), key)
}

/// Returns the key for a URL under `public_prefix`, or `None` for anything else
/// (external URLs, nested paths, traversal attempts).
pub(crate) fn key_for_url(public_prefix: &str, url: &str) -> Option<String> {
    let prefix = public_prefix.trim_end_matches('/');
    let key = url.strip_prefix(prefix)?.strip_prefix('/')?;
    validate_key(key).ok()?;
    Some(key.to_string())
}
