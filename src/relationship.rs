//! Relationship engine: follow / unfollow / block / unblock.
//!
//! Relationship state is denormalized onto both endpoints so "is
//! following" is a single document read: `A in B.following` iff
//! `B in A.followers`. Every mutation here keeps both sides in lockstep.
//! The two writes are not transactional; the actor's own document (the
//! `following` / `blocked_users` side) is always written first, so a crash
//! between them leaves a one-sided edge that `reconcile` can detect and
//! repair.
//!
//! Blocking is one-directional: it only marks the target in the actor's
//! `blocked_users` and force-removes the actor's follow edge. It does not
//! stop the target from following or liking the actor; the block is
//! enforced at feed-read time as a visibility filter.

use crate::activity;
use crate::auth::authenticate;
use crate::core::db::{self, KeyValue};
use crate::core::errors::ApiError;
use crate::core::helpers::{message_response, path_segment, store, validate_uuid};
use crate::models::models::{ActivityKind, User};
use spin_sdk::http::{Request, Response};

fn load_pair<S: KeyValue>(
    store: &S,
    actor_id: &str,
    target_id: &str,
) -> Result<(User, User), ApiError> {
    let actor = db::get_user(store, actor_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let target = db::get_user(store, target_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok((actor, target))
}

pub fn follow<S: KeyValue>(store: &S, actor_id: &str, target_id: &str) -> Result<(), ApiError> {
    if actor_id == target_id {
        return Err(ApiError::SelfReference(
            "You cannot follow yourself".to_string(),
        ));
    }
    let (mut actor, mut target) = load_pair(store, actor_id, target_id)?;

    if actor.following.iter().any(|id| id == target_id) {
        return Err(ApiError::Conflict(
            "You already follow this user".to_string(),
        ));
    }

    actor.following.push(target_id.to_string());
    db::put_user(store, &actor)?; // authoritative side first
    target.followers.push(actor_id.to_string());
    db::put_user(store, &target)?;

    activity::record(
        store,
        ActivityKind::UserFollowed,
        actor_id,
        Some(target_id),
        None,
    );
    tracing::info!(actor = %actor_id, target = %target_id, "user followed");
    Ok(())
}

pub fn unfollow<S: KeyValue>(store: &S, actor_id: &str, target_id: &str) -> Result<(), ApiError> {
    if actor_id == target_id {
        return Err(ApiError::SelfReference(
            "You cannot unfollow yourself".to_string(),
        ));
    }
    let (mut actor, mut target) = load_pair(store, actor_id, target_id)?;

    if !actor.following.iter().any(|id| id == target_id) {
        return Err(ApiError::Conflict(
            "You do not follow this user".to_string(),
        ));
    }

    actor.following.retain(|id| id != target_id);
    db::put_user(store, &actor)?;
    target.followers.retain(|id| id != actor_id);
    db::put_user(store, &target)?;

    tracing::info!(actor = %actor_id, target = %target_id, "user unfollowed");
    Ok(())
}

/// Blocking implies unfollowing: the actor's follow edge to the target is
/// force-removed as part of the same operation. Neither the block nor the
/// implied unfollow is recorded in the activity log.
pub fn block<S: KeyValue>(store: &S, actor_id: &str, target_id: &str) -> Result<(), ApiError> {
    if actor_id == target_id {
        return Err(ApiError::SelfReference(
            "You cannot block yourself".to_string(),
        ));
    }
    let (mut actor, mut target) = load_pair(store, actor_id, target_id)?;

    if actor.blocked_users.iter().any(|id| id == target_id) {
        return Err(ApiError::Conflict(
            "You already blocked this user".to_string(),
        ));
    }

    actor.blocked_users.push(target_id.to_string());
    let was_following = actor.following.iter().any(|id| id == target_id);
    if was_following {
        actor.following.retain(|id| id != target_id);
    }
    db::put_user(store, &actor)?;
    if was_following {
        target.followers.retain(|id| id != actor_id);
        db::put_user(store, &target)?;
    }

    tracing::info!(actor = %actor_id, target = %target_id, "user blocked");
    Ok(())
}

/// Does not restore any follow relationship that existed before the block.
pub fn unblock<S: KeyValue>(store: &S, actor_id: &str, target_id: &str) -> Result<(), ApiError> {
    let (mut actor, _target) = load_pair(store, actor_id, target_id)?;

    if !actor.blocked_users.iter().any(|id| id == target_id) {
        return Err(ApiError::Conflict(
            "You have not blocked this user".to_string(),
        ));
    }

    actor.blocked_users.retain(|id| id != target_id);
    db::put_user(store, &actor)?;

    tracing::info!(actor = %actor_id, target = %target_id, "user unblocked");
    Ok(())
}

/// Repair pass for the non-transactional mirror. `following` is the
/// authoritative side: every `followers` vector is rebuilt from it, and
/// self-references plus edges to missing users are dropped. Returns the
/// number of user documents rewritten.
pub fn reconcile<S: KeyValue>(store: &S) -> Result<usize, ApiError> {
    let ids = db::user_ids(store)?;
    let mut users = Vec::new();
    for id in &ids {
        if let Some(user) = db::get_user(store, id)? {
            users.push(user);
        }
    }

    let known: std::collections::HashSet<String> =
        users.iter().map(|u| u.id.clone()).collect();
    let mut repaired = 0;

    for i in 0..users.len() {
        let id = users[i].id.clone();
        let mut following = users[i].following.clone();
        following.retain(|t| *t != id && known.contains(t));
        // Restore set semantics; duplicates may not be adjacent.
        following.sort();
        following.dedup();

        let mut followers: Vec<String> = users
            .iter()
            .filter(|u| u.id != id && u.following.iter().any(|t| *t == id))
            .map(|u| u.id.clone())
            .collect();
        followers.sort();

        let mut blocked = users[i].blocked_users.clone();
        blocked.retain(|t| *t != id);

        let mut current_following = users[i].following.clone();
        current_following.sort();
        let mut current_followers = users[i].followers.clone();
        current_followers.sort();

        if following != current_following
            || followers != current_followers
            || blocked != users[i].blocked_users
        {
            users[i].following = following;
            users[i].followers = followers;
            users[i].blocked_users = blocked;
            db::put_user(store, &users[i])?;
            repaired += 1;
        }
    }

    if repaired > 0 {
        tracing::warn!(repaired, "relationship mirror reconciled");
    }
    Ok(repaired)
}

// === HTTP handlers ===

type RelationOp = fn(&spin_sdk::key_value::Store, &str, &str) -> Result<(), ApiError>;

fn handle_relation(req: Request, op: RelationOp, success: &str) -> anyhow::Result<Response> {
    let store = store();
    let actor = match authenticate(&store, &req) {
        Ok(user) => user,
        Err(e) => return Ok(e.into()),
    };
    let target_id = match path_segment(req.path(), 2) {
        Some(id) if validate_uuid(id) => id.to_string(),
        _ => return Ok(ApiError::Validation("User ID required".to_string()).into()),
    };

    match op(&store, &actor.id, &target_id) {
        Ok(()) => message_response(200, success),
        Err(e) => Ok(e.into()),
    }
}

pub fn follow_handler(req: Request) -> anyhow::Result<Response> {
    handle_relation(req, follow, "User followed")
}

pub fn unfollow_handler(req: Request) -> anyhow::Result<Response> {
    handle_relation(req, unfollow, "User unfollowed")
}

pub fn block_handler(req: Request) -> anyhow::Result<Response> {
    handle_relation(req, block, "User blocked")
}

pub fn unblock_handler(req: Request) -> anyhow::Result<Response> {
    handle_relation(req, unblock, "User unblocked")
}
