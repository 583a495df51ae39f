use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Account privilege level. Closed set; policy decisions match on it
/// exhaustively.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            _ => Err(()),
        }
    }
}

/// Stored user document. The relationship vectors carry set semantics and
/// are mutated only by the relationship engine; `following`/`followers`
/// are mirror images of each other across documents. The password hash is
/// persisted here but never reaches an API projection.
#[derive(Serialize, Deserialize, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub following: Vec<String>,
    #[serde(default)]
    pub followers: Vec<String>,
    #[serde(default)]
    pub blocked_users: Vec<String>,
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Post {
    pub id: String,
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub likes: Vec<String>,
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PostCreated,
    UserFollowed,
    PostLiked,
}

/// Append-only log entry. `user_followed` always carries `target_user`;
/// `post_created` and `post_liked` always carry `target_post`.
#[derive(Serialize, Deserialize, Clone)]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub actor: String,
    pub target_user: Option<String>,
    pub target_post: Option<String>,
    pub created_at: String,
}

#[derive(Serialize, Deserialize)]
pub struct TokenData {
    pub user_id: String,
    pub created_at: String,
}
