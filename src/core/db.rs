use crate::config::*;
use crate::models::models::{Activity, Post, TokenData, User};
use serde::de::DeserializeOwned;
use serde::Serialize;
use spin_sdk::key_value::Store;
use std::collections::HashMap;
use std::sync::Mutex;

/// Storage seam for every document access. The Spin key-value `Store`
/// backs the deployed component; `MemStore` backs the test suite. Domain
/// code only sees JSON documents keyed by the builders in `config`.
pub trait KeyValue {
    fn get_raw(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    fn set_raw(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;
    fn delete(&self, key: &str) -> anyhow::Result<()>;

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        self.set_raw(key, &serde_json::to_vec(value)?)
    }
}

impl KeyValue for Store {
    fn get_raw(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(Store::get(self, key)?)
    }

    fn set_raw(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        Ok(Store::set(self, key, value)?)
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        Ok(Store::delete(self, key)?)
    }
}

/// In-memory store for tests; same document layout as the real store.
#[derive(Default)]
pub struct MemStore {
    data: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValue for MemStore {
    fn get_raw(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        self.data.lock().unwrap().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.data.lock().unwrap().remove(key);
        Ok(())
    }
}

// === Users ===

pub fn get_user<S: KeyValue>(store: &S, id: &str) -> anyhow::Result<Option<User>> {
    store.get_json(&user_key(id))
}

pub fn put_user<S: KeyValue>(store: &S, user: &User) -> anyhow::Result<()> {
    store.set_json(&user_key(&user.id), user)
}

pub fn user_ids<S: KeyValue>(store: &S) -> anyhow::Result<Vec<String>> {
    Ok(store.get_json(USERS_LIST_KEY)?.unwrap_or_default())
}

pub fn register_user<S: KeyValue>(store: &S, user: &User) -> anyhow::Result<()> {
    put_user(store, user)?;
    let mut ids = user_ids(store)?;
    ids.push(user.id.clone());
    store.set_json(USERS_LIST_KEY, &ids)
}

pub fn remove_user<S: KeyValue>(store: &S, id: &str) -> anyhow::Result<()> {
    store.delete(&user_key(id))?;
    let mut ids = user_ids(store)?;
    ids.retain(|i| i != id);
    store.set_json(USERS_LIST_KEY, &ids)
}

pub fn find_user_by_email<S: KeyValue>(store: &S, email: &str) -> anyhow::Result<Option<User>> {
    for id in user_ids(store)? {
        if let Some(user) = get_user(store, &id)? {
            if user.email == email {
                return Ok(Some(user));
            }
        }
    }
    Ok(None)
}

// === Posts ===

pub fn get_post<S: KeyValue>(store: &S, id: &str) -> anyhow::Result<Option<Post>> {
    store.get_json(&post_key(id))
}

pub fn put_post<S: KeyValue>(store: &S, post: &Post) -> anyhow::Result<()> {
    store.set_json(&post_key(&post.id), post)
}

pub fn post_ids<S: KeyValue>(store: &S) -> anyhow::Result<Vec<String>> {
    Ok(store.get_json(POSTS_LIST_KEY)?.unwrap_or_default())
}

pub fn register_post<S: KeyValue>(store: &S, post: &Post) -> anyhow::Result<()> {
    put_post(store, post)?;
    let mut ids = post_ids(store)?;
    ids.insert(0, post.id.clone()); // newest first
    store.set_json(POSTS_LIST_KEY, &ids)
}

pub fn remove_post<S: KeyValue>(store: &S, id: &str) -> anyhow::Result<()> {
    store.delete(&post_key(id))?;
    let mut ids = post_ids(store)?;
    ids.retain(|i| i != id);
    store.set_json(POSTS_LIST_KEY, &ids)
}

// === Activities ===

pub fn get_activity<S: KeyValue>(store: &S, id: &str) -> anyhow::Result<Option<Activity>> {
    store.get_json(&activity_key(id))
}

pub fn activity_ids<S: KeyValue>(store: &S) -> anyhow::Result<Vec<String>> {
    Ok(store.get_json(ACTIVITIES_LIST_KEY)?.unwrap_or_default())
}

pub fn append_activity<S: KeyValue>(store: &S, activity: &Activity) -> anyhow::Result<()> {
    store.set_json(&activity_key(&activity.id), activity)?;
    let mut ids = activity_ids(store)?;
    ids.insert(0, activity.id.clone()); // newest first
    store.set_json(ACTIVITIES_LIST_KEY, &ids)
}

// === Tokens ===

pub fn get_token<S: KeyValue>(store: &S, token: &str) -> anyhow::Result<Option<TokenData>> {
    store.get_json(&token_key(token))
}

pub fn put_token<S: KeyValue>(store: &S, token: &str, data: &TokenData) -> anyhow::Result<()> {
    store.set_json(&token_key(token), data)
}

pub fn remove_token<S: KeyValue>(store: &S, token: &str) -> anyhow::Result<()> {
    store.delete(&token_key(token))
}
