use rand::Rng;

const MAX_FIELD_PREFIX_LEN: usize = 64;
const RANDOM_SUFFIX_BOUND: u32 = 1_000_000_000;

/// `{field}-{unix millis}-{random 0..1e9}.{extension}`
///
/// Unique in practice, not guaranteed: there is no existence check here.
/// Storage refuses to overwrite, so a collision fails the batch instead of
/// replacing a file.
pub fn generate_filename(field_name: &str, extension: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = rand::rng().random_range(0..RANDOM_SUFFIX_BOUND);
    format!(
        "{}-{}-{}.{}",
        field_prefix(field_name),
        millis,
        suffix,
        extension
    )
}

/// The multipart field name is client-controlled; keep it filename-safe.
fn field_prefix(field_name: &str) -> String {
    let prefix: String = field_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(MAX_FIELD_PREFIX_LEN)
        .collect();
    if prefix.is_empty() {
        "image".to_string()
    } else {
        prefix
    }
}
