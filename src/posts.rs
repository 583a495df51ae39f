use crate::activity;
use crate::auth::authenticate;
use crate::config::MAX_POST_LENGTH;
use crate::core::db::{self, KeyValue};
use crate::core::errors::ApiError;
use crate::core::helpers::{
    json_response, message_response, now_iso, path_segment, sanitize_text, store, validate_uuid,
};
use crate::models::models::{ActivityKind, Post, User};
use crate::policy;
use spin_sdk::http::{Request, Response};
use uuid::Uuid;

// === Core operations ===

pub fn create_post<S: KeyValue>(
    store: &S,
    author_id: &str,
    content: &str,
) -> Result<Post, ApiError> {
    if content.len() > MAX_POST_LENGTH {
        return Err(ApiError::Validation("Content too long".to_string()));
    }
    let content = sanitize_text(content);
    if content.is_empty() {
        return Err(ApiError::Validation("Content is required".to_string()));
    }

    let post = Post {
        id: Uuid::new_v4().to_string(),
        author: author_id.to_string(),
        content,
        likes: vec![],
        created_at: now_iso(),
    };
    db::register_post(store, &post)?;

    activity::record(
        store,
        ActivityKind::PostCreated,
        author_id,
        None,
        Some(&post.id),
    );
    tracing::info!(post = %post.id, author = %author_id, "post created");
    Ok(post)
}

/// Author, admin or owner only. Activity entries referencing the post stay
/// in the log; the feed projection renders them with a null target.
pub fn delete_post<S: KeyValue>(
    store: &S,
    requester: &User,
    post_id: &str,
) -> Result<(), ApiError> {
    let post = db::get_post(store, post_id)?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if !policy::can_delete_post(requester, &post) {
        return Err(ApiError::Authorization("Not authorized".to_string()));
    }

    db::remove_post(store, post_id)?;
    tracing::info!(post = %post_id, requester = %requester.id, "post removed");
    Ok(())
}

/// Toggle. Returns true when the invocation liked the post, false when it
/// removed an existing like. Only the like direction appends a
/// `post_liked` activity.
pub fn like_post<S: KeyValue>(store: &S, user_id: &str, post_id: &str) -> Result<bool, ApiError> {
    let mut post = db::get_post(store, post_id)?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if post.likes.iter().any(|id| id == user_id) {
        post.likes.retain(|id| id != user_id);
        db::put_post(store, &post)?;
        Ok(false)
    } else {
        post.likes.push(user_id.to_string());
        db::put_post(store, &post)?;
        activity::record(store, ActivityKind::PostLiked, user_id, None, Some(post_id));
        Ok(true)
    }
}

// === HTTP handlers ===

pub fn create_handler(req: Request) -> anyhow::Result<Response> {
    let store = store();
    let author = match authenticate(&store, &req) {
        Ok(user) => user,
        Err(e) => return Ok(e.into()),
    };

    let body: serde_json::Value = match serde_json::from_slice(req.body()) {
        Ok(v) => v,
        Err(_) => return Ok(ApiError::Validation("Invalid JSON body".to_string()).into()),
    };
    let content = body["content"].as_str().unwrap_or_default();

    match create_post(&store, &author.id, content) {
        Ok(post) => json_response(201, &post),
        Err(e) => Ok(e.into()),
    }
}

pub fn delete_handler(req: Request) -> anyhow::Result<Response> {
    let store = store();
    let requester = match authenticate(&store, &req) {
        Ok(user) => user,
        Err(e) => return Ok(e.into()),
    };
    let post_id = match path_segment(req.path(), 2) {
        Some(id) if validate_uuid(id) => id.to_string(),
        _ => return Ok(ApiError::Validation("Post ID required".to_string()).into()),
    };

    match delete_post(&store, &requester, &post_id) {
        Ok(()) => message_response(200, "Post removed"),
        Err(e) => Ok(e.into()),
    }
}

pub fn like_handler(req: Request) -> anyhow::Result<Response> {
    let store = store();
    let user = match authenticate(&store, &req) {
        Ok(user) => user,
        Err(e) => return Ok(e.into()),
    };
    let post_id = match path_segment(req.path(), 2) {
        Some(id) if validate_uuid(id) => id.to_string(),
        _ => return Ok(ApiError::Validation("Post ID required".to_string()).into()),
    };

    match like_post(&store, &user.id, &post_id) {
        Ok(true) => message_response(200, "Post liked"),
        Ok(false) => message_response(200, "Post unliked"),
        Err(e) => Ok(e.into()),
    }
}
