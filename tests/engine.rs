//! Relationship engine behavior against the in-memory store.

use ripple::auth;
use ripple::core::db::{self, KeyValue, MemStore};
use ripple::core::errors::ApiError;
use ripple::models::models::{ActivityKind, User};
use ripple::relationship;

/// Store whose activity-log writes fail, for exercising best-effort
/// logging.
struct LogLessStore {
    inner: MemStore,
}

impl KeyValue for LogLessStore {
    fn get_raw(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        self.inner.get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        if key.starts_with("activit") {
            anyhow::bail!("activity log unavailable");
        }
        self.inner.set_raw(key, value)
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.inner.delete(key)
    }
}

fn seed_user(store: &MemStore, name: &str) -> User {
    let (user, _token) = auth::signup(
        store,
        name,
        &format!("{}@example.com", name),
        "password",
        None,
    )
    .expect("signup failed");
    user
}

fn reload(store: &MemStore, id: &str) -> User {
    db::get_user(store, id).unwrap().expect("user missing")
}

fn activities(store: &MemStore) -> Vec<ripple::models::models::Activity> {
    db::activity_ids(store)
        .unwrap()
        .iter()
        .filter_map(|id| db::get_activity(store, id).unwrap())
        .collect()
}

#[test]
fn follow_mirrors_both_sides_and_logs_once() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");
    let b = seed_user(&store, "bob");

    relationship::follow(&store, &a.id, &b.id).unwrap();

    let a = reload(&store, &a.id);
    let b = reload(&store, &b.id);
    assert!(a.following.contains(&b.id));
    assert!(b.followers.contains(&a.id));
    assert!(b.following.is_empty());
    assert!(a.followers.is_empty());

    let followed: Vec<_> = activities(&store)
        .into_iter()
        .filter(|act| act.kind == ActivityKind::UserFollowed)
        .collect();
    assert_eq!(followed.len(), 1);
    assert_eq!(followed[0].actor, a.id);
    assert_eq!(followed[0].target_user.as_deref(), Some(b.id.as_str()));
    assert!(followed[0].target_post.is_none());
}

#[test]
fn duplicate_follow_is_a_conflict_without_side_effects() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");
    let b = seed_user(&store, "bob");

    relationship::follow(&store, &a.id, &b.id).unwrap();
    let err = relationship::follow(&store, &a.id, &b.id).unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    let a = reload(&store, &a.id);
    let b = reload(&store, &b.id);
    assert_eq!(a.following.iter().filter(|id| **id == b.id).count(), 1);
    assert_eq!(b.followers.iter().filter(|id| **id == a.id).count(), 1);
    assert_eq!(
        activities(&store)
            .iter()
            .filter(|act| act.kind == ActivityKind::UserFollowed)
            .count(),
        1
    );
}

#[test]
fn self_reference_is_rejected() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");

    assert!(matches!(
        relationship::follow(&store, &a.id, &a.id),
        Err(ApiError::SelfReference(_))
    ));
    assert!(matches!(
        relationship::unfollow(&store, &a.id, &a.id),
        Err(ApiError::SelfReference(_))
    ));
    assert!(matches!(
        relationship::block(&store, &a.id, &a.id),
        Err(ApiError::SelfReference(_))
    ));
}

#[test]
fn follow_requires_both_users() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");

    assert!(matches!(
        relationship::follow(&store, &a.id, "11111111-1111-1111-1111-111111111111"),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn unfollow_removes_both_sides_and_logs_nothing() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");
    let b = seed_user(&store, "bob");

    relationship::follow(&store, &a.id, &b.id).unwrap();
    let log_len = activities(&store).len();
    relationship::unfollow(&store, &a.id, &b.id).unwrap();

    let a = reload(&store, &a.id);
    let b = reload(&store, &b.id);
    assert!(!a.following.contains(&b.id));
    assert!(!b.followers.contains(&a.id));
    assert_eq!(activities(&store).len(), log_len);
}

#[test]
fn unfollow_without_follow_is_a_conflict() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");
    let b = seed_user(&store, "bob");

    assert!(matches!(
        relationship::unfollow(&store, &a.id, &b.id),
        Err(ApiError::Conflict(_))
    ));
}

#[test]
fn block_implies_unfollow_and_logs_nothing() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");
    let b = seed_user(&store, "bob");

    relationship::follow(&store, &a.id, &b.id).unwrap();
    let log_len = activities(&store).len();

    relationship::block(&store, &a.id, &b.id).unwrap();

    let a = reload(&store, &a.id);
    let b = reload(&store, &b.id);
    assert!(a.blocked_users.contains(&b.id));
    assert!(!a.following.contains(&b.id));
    assert!(!b.followers.contains(&a.id));
    assert_eq!(activities(&store).len(), log_len);
}

#[test]
fn block_is_one_directional() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");
    let b = seed_user(&store, "bob");

    relationship::block(&store, &a.id, &b.id).unwrap();

    // The blocked user may still follow the blocker.
    relationship::follow(&store, &b.id, &a.id).unwrap();
    let a = reload(&store, &a.id);
    let b = reload(&store, &b.id);
    assert!(b.following.contains(&a.id));
    assert!(a.followers.contains(&b.id));
}

#[test]
fn double_block_is_a_conflict() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");
    let b = seed_user(&store, "bob");

    relationship::block(&store, &a.id, &b.id).unwrap();
    assert!(matches!(
        relationship::block(&store, &a.id, &b.id),
        Err(ApiError::Conflict(_))
    ));
}

#[test]
fn unblock_does_not_restore_follow() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");
    let b = seed_user(&store, "bob");

    relationship::follow(&store, &a.id, &b.id).unwrap();
    relationship::block(&store, &a.id, &b.id).unwrap();
    relationship::unblock(&store, &a.id, &b.id).unwrap();

    let a = reload(&store, &a.id);
    assert!(!a.blocked_users.contains(&b.id));
    assert!(!a.following.contains(&b.id));
}

#[test]
fn unblock_without_block_is_a_conflict() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");
    let b = seed_user(&store, "bob");

    assert!(matches!(
        relationship::unblock(&store, &a.id, &b.id),
        Err(ApiError::Conflict(_))
    ));
}

#[test]
fn reconcile_repairs_a_one_sided_edge() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");
    let b = seed_user(&store, "bob");

    // Simulate a crash after the authoritative write: alice follows bob,
    // but bob's followers never got the mirror entry.
    let mut broken = reload(&store, &a.id);
    broken.following.push(b.id.clone());
    db::put_user(&store, &broken).unwrap();

    let repaired = relationship::reconcile(&store).unwrap();
    assert!(repaired >= 1);

    let b = reload(&store, &b.id);
    assert!(b.followers.contains(&a.id));
}

#[test]
fn follow_survives_a_failed_activity_append() {
    let store = LogLessStore {
        inner: MemStore::new(),
    };
    let (a, _) = auth::signup(&store, "alice", "alice@example.com", "password", None).unwrap();
    let (b, _) = auth::signup(&store, "bob", "bob@example.com", "password", None).unwrap();

    relationship::follow(&store, &a.id, &b.id).unwrap();

    let a = db::get_user(&store, &a.id).unwrap().unwrap();
    let b = db::get_user(&store, &b.id).unwrap().unwrap();
    assert!(a.following.contains(&b.id));
    assert!(b.followers.contains(&a.id));
    assert!(db::activity_ids(&store).unwrap().is_empty());
}

#[test]
fn reconcile_restores_set_semantics() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");
    let b = seed_user(&store, "bob");
    let c = seed_user(&store, "carol");

    // Duplicate edges need not be adjacent.
    let mut broken = reload(&store, &a.id);
    broken.following = vec![b.id.clone(), c.id.clone(), b.id.clone()];
    db::put_user(&store, &broken).unwrap();

    relationship::reconcile(&store).unwrap();

    let a = reload(&store, &a.id);
    assert_eq!(a.following.iter().filter(|id| **id == b.id).count(), 1);
    assert_eq!(a.following.iter().filter(|id| **id == c.id).count(), 1);
    assert_eq!(a.following.len(), 2);
}

#[test]
fn reconcile_drops_self_and_dangling_references() {
    let store = MemStore::new();
    let a = seed_user(&store, "alice");

    let mut broken = reload(&store, &a.id);
    broken.following.push(a.id.clone());
    broken
        .following
        .push("22222222-2222-2222-2222-222222222222".to_string());
    db::put_user(&store, &broken).unwrap();

    relationship::reconcile(&store).unwrap();

    let a = reload(&store, &a.id);
    assert!(a.following.is_empty());
}
