//! Append-only activity log and the per-viewer feed projection.

use crate::auth::authenticate;
use crate::config::FEED_SNIPPET_LENGTH;
use crate::core::db::{self, KeyValue};
use crate::core::helpers::{json_response, now_iso, store};
use crate::models::models::{Activity, ActivityKind, User};
use serde::Serialize;
use spin_sdk::http::{Request, Response};
use uuid::Uuid;

/// Append one entry. Entries are never mutated or deleted afterwards, so
/// the log tolerates actors, users and posts that later disappear.
///
/// The log is best-effort: a failed append is reported in the logs but
/// never fails the operation that triggered it, which has already landed.
pub fn record<S: KeyValue>(
    store: &S,
    kind: ActivityKind,
    actor: &str,
    target_user: Option<&str>,
    target_post: Option<&str>,
) {
    let activity = Activity {
        id: Uuid::new_v4().to_string(),
        kind,
        actor: actor.to_string(),
        target_user: target_user.map(str::to_string),
        target_post: target_post.map(str::to_string),
        created_at: now_iso(),
    };
    if let Err(err) = db::append_activity(store, &activity) {
        tracing::error!(%err, kind = ?kind, "failed to append activity");
    }
}

#[derive(Serialize)]
pub struct UserRef {
    pub id: String,
    pub username: String,
}

#[derive(Serialize)]
pub struct PostRef {
    pub id: String,
    pub content: String,
}

/// One feed entry with references resolved to display form. References
/// that no longer resolve (deleted user or post) come out as `null`
/// rather than failing the projection.
#[derive(Serialize)]
pub struct FeedItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub actor: Option<UserRef>,
    pub target_user: Option<UserRef>,
    pub target_post: Option<PostRef>,
    pub created_at: String,
}

fn user_ref<S: KeyValue>(store: &S, id: &str) -> anyhow::Result<Option<UserRef>> {
    Ok(db::get_user(store, id)?.map(|u| UserRef {
        id: u.id,
        username: u.username,
    }))
}

fn post_ref<S: KeyValue>(store: &S, id: &str) -> anyhow::Result<Option<PostRef>> {
    Ok(db::get_post(store, id)?.map(|p| PostRef {
        id: p.id,
        content: snippet(&p.content),
    }))
}

fn snippet(content: &str) -> String {
    match content.char_indices().nth(FEED_SNIPPET_LENGTH) {
        Some((idx, _)) => format!("{}…", &content[..idx]),
        None => content.to_string(),
    }
}

/// Read-only projection of the whole eligible log for one viewer: every
/// entry whose actor the viewer has not blocked, newest first. The sort is
/// stable and the index list is already newest-first, so ties keep their
/// insertion order across repeated calls.
pub fn feed<S: KeyValue>(store: &S, viewer: &User) -> anyhow::Result<Vec<FeedItem>> {
    let mut items = Vec::new();

    for id in db::activity_ids(store)? {
        let Some(activity) = db::get_activity(store, &id)? else {
            continue;
        };
        if viewer.blocked_users.iter().any(|b| *b == activity.actor) {
            continue;
        }

        let target_user = match &activity.target_user {
            Some(id) => user_ref(store, id)?,
            None => None,
        };
        let target_post = match &activity.target_post {
            Some(id) => post_ref(store, id)?,
            None => None,
        };
        items.push(FeedItem {
            id: activity.id,
            kind: activity.kind,
            actor: user_ref(store, &activity.actor)?,
            target_user,
            target_post,
            created_at: activity.created_at,
        });
    }

    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(items)
}

// === HTTP handlers ===

pub fn feed_handler(req: Request) -> anyhow::Result<Response> {
    let store = store();
    let viewer = match authenticate(&store, &req) {
        Ok(user) => user,
        Err(e) => return Ok(e.into()),
    };

    let items = feed(&store, &viewer)?;
    json_response(200, &items)
}
