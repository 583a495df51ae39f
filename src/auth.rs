use crate::config::*;
use crate::core::db::{self, KeyValue};
use crate::core::errors::ApiError;
use crate::core::helpers::{
    hash_password, json_response, message_response, now_iso, sanitize_text, store, verify_password,
};
use crate::models::models::{Role, TokenData, User};
use spin_sdk::http::{Request, Response};
use std::str::FromStr;
use uuid::Uuid;

// === Core operations ===

pub fn signup<S: KeyValue>(
    store: &S,
    username: &str,
    email: &str,
    password: &str,
    role: Option<&str>,
) -> Result<(User, String), ApiError> {
    // Validate what will actually be stored, not the raw input.
    let username = sanitize_text(username);
    if username.is_empty() {
        return Err(ApiError::Validation("Username is required".to_string()));
    }
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::Validation(
            "Username must be 3-50 characters".to_string(),
        ));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Validation("Valid email is required".to_string()));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(
            "Password must be at least 3 characters".to_string(),
        ));
    }

    // Bootstrap path: an explicit role is accepted at signup but must be a
    // known role value.
    let role = match role {
        Some(r) => Role::from_str(r).map_err(|_| ApiError::Validation("Invalid role".to_string()))?,
        None => Role::default(),
    };

    if db::find_user_by_email(store, email)?.is_some() {
        return Err(ApiError::Validation("User already exists".to_string()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        username,
        email: email.to_string(),
        password: hash_password(password)?,
        role,
        following: vec![],
        followers: vec![],
        blocked_users: vec![],
        created_at: now_iso(),
    };
    db::register_user(store, &user)?;

    let token = issue_token(store, &user.id)?;
    tracing::info!(user = %user.id, "user registered");
    Ok((user, token))
}

pub fn login<S: KeyValue>(
    store: &S,
    email: &str,
    password: &str,
) -> Result<(User, String), ApiError> {
    let user = db::find_user_by_email(store, email)?;
    match user {
        Some(user) if verify_password(password, &user.password) => {
            let token = issue_token(store, &user.id)?;
            Ok((user, token))
        }
        _ => Err(ApiError::Authentication),
    }
}

pub fn issue_token<S: KeyValue>(store: &S, user_id: &str) -> anyhow::Result<String> {
    let token = Uuid::new_v4().to_string();
    let data = TokenData {
        user_id: user_id.to_string(),
        created_at: now_iso(),
    };
    db::put_token(store, &token, &data)?;
    Ok(token)
}

/// Opaque token -> user id, enforcing expiry and that the account still
/// exists (stale tokens die with their accounts).
pub fn resolve_token<S: KeyValue>(store: &S, token: &str) -> anyhow::Result<Option<String>> {
    let Some(data) = db::get_token(store, token)? else {
        return Ok(None);
    };
    if let Ok(created) = chrono::DateTime::parse_from_rfc3339(&data.created_at) {
        let age_hours = (chrono::Utc::now() - created.with_timezone(&chrono::Utc)).num_hours();
        if age_hours > token_expiration_hours() {
            return Ok(None);
        }
    }
    if db::get_user(store, &data.user_id)?.is_none() {
        return Ok(None);
    }
    Ok(Some(data.user_id))
}

fn bearer_token(req: &Request) -> Option<&str> {
    let auth_header = req.header("Authorization")?.as_str()?;
    auth_header.strip_prefix("Bearer ")
}

/// Authentication gate: bearer credential -> user document. Runs before
/// every authorized operation.
pub fn authenticate<S: KeyValue>(store: &S, req: &Request) -> Result<User, ApiError> {
    let token = bearer_token(req).ok_or(ApiError::Authentication)?;
    let user_id = resolve_token(store, token)?.ok_or(ApiError::Authentication)?;
    db::get_user(store, &user_id)?.ok_or(ApiError::Authentication)
}

/// Route-level role gate, applied before any target lookup.
pub fn authorize(user: &User, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Authorization(format!(
            "User role {} is not authorized to access this route",
            user.role.as_str()
        )))
    }
}

// === HTTP handlers ===

fn identity_json(user: &User, token: &str) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "role": user.role,
        "token": token,
    })
}

pub fn signup_handler(req: Request) -> anyhow::Result<Response> {
    let store = store();
    let body: serde_json::Value = match serde_json::from_slice(req.body()) {
        Ok(v) => v,
        Err(_) => return Ok(ApiError::Validation("Invalid JSON body".to_string()).into()),
    };
    let username = body["username"].as_str().unwrap_or_default();
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let role = body["role"].as_str();

    match signup(&store, username, email, password, role) {
        Ok((user, token)) => json_response(201, &identity_json(&user, &token)),
        Err(e) => Ok(e.into()),
    }
}

pub fn login_handler(req: Request) -> anyhow::Result<Response> {
    let store = store();
    let body: serde_json::Value = match serde_json::from_slice(req.body()) {
        Ok(v) => v,
        Err(_) => return Ok(ApiError::Validation("Invalid JSON body".to_string()).into()),
    };
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    match login(&store, email, password) {
        Ok((user, token)) => json_response(200, &identity_json(&user, &token)),
        Err(e) => Ok(e.into()),
    }
}

pub fn logout_handler(req: Request) -> anyhow::Result<Response> {
    let store = store();
    let Some(token) = bearer_token(&req) else {
        return Ok(ApiError::Authentication.into());
    };
    db::remove_token(&store, token)?;
    message_response(200, "Logged out successfully")
}
