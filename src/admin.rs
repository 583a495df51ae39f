use crate::auth::{authenticate, authorize};
use crate::core::db::{self, KeyValue};
use crate::core::errors::ApiError;
use crate::core::helpers::{message_response, path_segment, store, validate_uuid};
use crate::models::models::{Role, User};
use crate::policy;
use spin_sdk::http::{Request, Response};
use std::str::FromStr;

// === Core operations ===

/// Deletes the account and cascades to every post it authored. Relationship
/// references to the deleted id in other documents are left for
/// `relationship::reconcile`; activity entries stay in the append-only log.
pub fn delete_user<S: KeyValue>(
    store: &S,
    requester: &User,
    target_id: &str,
) -> Result<(), ApiError> {
    let target = db::get_user(store, target_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    policy::can_delete_user(requester.role, target.role)?;

    for post_id in db::post_ids(store)? {
        if let Some(post) = db::get_post(store, &post_id)? {
            if post.author == target_id {
                db::remove_post(store, &post_id)?;
            }
        }
    }
    db::remove_user(store, target_id)?;

    tracing::info!(target = %target_id, requester = %requester.id, "user removed");
    Ok(())
}

/// Role values outside {user, admin} are rejected before the target is
/// looked up, and the target is left untouched.
pub fn update_role<S: KeyValue>(store: &S, target_id: &str, role: &str) -> Result<Role, ApiError> {
    let role = Role::from_str(role)
        .ok()
        .filter(|r| policy::assignable(*r))
        .ok_or_else(|| ApiError::Validation("Invalid role".to_string()))?;

    let mut target = db::get_user(store, target_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    target.role = role;
    db::put_user(store, &target)?;

    tracing::info!(target = %target_id, role = role.as_str(), "user role updated");
    Ok(role)
}

// === HTTP handlers ===

pub fn delete_user_handler(req: Request) -> anyhow::Result<Response> {
    let store = store();
    let requester = match authenticate(&store, &req) {
        Ok(user) => user,
        Err(e) => return Ok(e.into()),
    };
    if let Err(e) = authorize(&requester, &[Role::Admin, Role::Owner]) {
        return Ok(e.into());
    }
    let target_id = match path_segment(req.path(), 3) {
        Some(id) if validate_uuid(id) => id.to_string(),
        _ => return Ok(ApiError::Validation("User ID required".to_string()).into()),
    };

    match delete_user(&store, &requester, &target_id) {
        Ok(()) => message_response(200, "User removed"),
        Err(e) => Ok(e.into()),
    }
}

pub fn update_role_handler(req: Request) -> anyhow::Result<Response> {
    let store = store();
    let requester = match authenticate(&store, &req) {
        Ok(user) => user,
        Err(e) => return Ok(e.into()),
    };
    if let Err(e) = authorize(&requester, &[Role::Owner]) {
        return Ok(e.into());
    }
    let target_id = match path_segment(req.path(), 3) {
        Some(id) if validate_uuid(id) => id.to_string(),
        _ => return Ok(ApiError::Validation("User ID required".to_string()).into()),
    };

    let body: serde_json::Value = match serde_json::from_slice(req.body()) {
        Ok(v) => v,
        Err(_) => return Ok(ApiError::Validation("Invalid JSON body".to_string()).into()),
    };
    let role = body["role"].as_str().unwrap_or_default();

    match update_role(&store, &target_id, role) {
        Ok(role) => message_response(200, &format!("User role updated to {}", role.as_str())),
        Err(e) => Ok(e.into()),
    }
}
