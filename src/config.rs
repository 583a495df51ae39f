pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 3;
pub const MAX_POST_LENGTH: usize = 5000;
pub const FEED_SNIPPET_LENGTH: usize = 140;

pub const USERS_LIST_KEY: &str = "users_list";
pub const POSTS_LIST_KEY: &str = "posts_list";
pub const ACTIVITIES_LIST_KEY: &str = "activities_list";

pub fn user_key(id: &str) -> String {
    format!("user:{}", id)
}

pub fn post_key(id: &str) -> String {
    format!("post:{}", id)
}

pub fn activity_key(id: &str) -> String {
    format!("activity:{}", id)
}

pub fn token_key(token: &str) -> String {
    format!("token:{}", token)
}

pub fn token_expiration_hours() -> i64 {
    std::env::var("RIPPLE_TOKEN_EXPIRATION_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(24)
}
