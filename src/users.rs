use crate::auth::authenticate;
use crate::core::db::{self, KeyValue};
use crate::core::errors::ApiError;
use crate::core::helpers::{json_response, path_segment, store, validate_uuid};
use crate::models::models::User;
use spin_sdk::http::{Request, Response};

/// Profile projection: everything except the password hash.
pub fn profile_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "role": user.role,
        "following": user.following,
        "followers": user.followers,
        "blocked_users": user.blocked_users,
        "created_at": user.created_at,
    })
}

pub fn get_profile<S: KeyValue>(store: &S, user_id: &str) -> Result<User, ApiError> {
    db::get_user(store, user_id)?.ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

// === HTTP handlers ===

pub fn profile_handler(req: Request) -> anyhow::Result<Response> {
    let store = store();
    if let Err(e) = authenticate(&store, &req) {
        return Ok(e.into());
    }
    let user_id = match path_segment(req.path(), 2) {
        Some(id) if validate_uuid(id) => id.to_string(),
        _ => return Ok(ApiError::Validation("User ID required".to_string()).into()),
    };

    match get_profile(&store, &user_id) {
        Ok(user) => json_response(200, &profile_json(&user)),
        Err(e) => Ok(e.into()),
    }
}
