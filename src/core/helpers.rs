use ammonia::Builder;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use spin_sdk::http::Response;
use spin_sdk::key_value::Store;
use uuid::Uuid;

pub fn store() -> Store {
    Store::open_default().expect("KV store must exist")
}

pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::PasswordHash;

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn validate_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Strip all HTML, leaving plain text.
pub fn sanitize_text(text: &str) -> String {
    Builder::default()
        .tags(std::collections::HashSet::new())
        .clean(text)
        .to_string()
}

/// Path segment by zero-based index, e.g. segment 2 of
/// `/api/users/{id}/follow` is the user id.
pub fn path_segment(path: &str, index: usize) -> Option<&str> {
    path.trim_start_matches('/')
        .split('/')
        .nth(index)
        .filter(|s| !s.is_empty())
}

pub fn json_response<T: serde::Serialize>(status: u16, body: &T) -> anyhow::Result<Response> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(body)?)
        .build())
}

pub fn message_response(status: u16, message: &str) -> anyhow::Result<Response> {
    json_response(status, &serde_json::json!({ "message": message }))
}
