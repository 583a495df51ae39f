pub mod activity;
pub mod admin;
pub mod auth;
pub mod config;
pub mod core;
pub mod models;
pub mod policy;
pub mod posts;
pub mod relationship;
pub mod users;

use spin_sdk::http::{Request, Response};
#[cfg(target_arch = "wasm32")]
use spin_sdk::http::IntoResponse;
#[cfg(target_arch = "wasm32")]
use spin_sdk::http_component;

/// Route dispatch shared by the Spin component and the native adapter
/// binary.
pub fn route(req: Request) -> anyhow::Result<Response> {
    let path = req.path().to_string();
    let method = req.method().to_string();

    match (method.as_str(), path.as_str()) {
        ("POST", "/api/auth/signup") => auth::signup_handler(req),
        ("POST", "/api/auth/login") => auth::login_handler(req),
        ("POST", "/api/auth/logout") => auth::logout_handler(req),
        ("GET", "/api/activity") => activity::feed_handler(req),
        ("POST", "/api/posts") => posts::create_handler(req),
        ("PUT", p) if p.starts_with("/api/users/") && p.ends_with("/follow") => {
            relationship::follow_handler(req)
        }
        ("PUT", p) if p.starts_with("/api/users/") && p.ends_with("/unfollow") => {
            relationship::unfollow_handler(req)
        }
        ("PUT", p) if p.starts_with("/api/users/") && p.ends_with("/unblock") => {
            relationship::unblock_handler(req)
        }
        ("PUT", p) if p.starts_with("/api/users/") && p.ends_with("/block") => {
            relationship::block_handler(req)
        }
        ("GET", p) if p.starts_with("/api/users/") => users::profile_handler(req),
        ("PUT", p) if p.starts_with("/api/posts/") && p.ends_with("/like") => {
            posts::like_handler(req)
        }
        ("DELETE", p) if p.starts_with("/api/posts/") => posts::delete_handler(req),
        ("DELETE", p) if p.starts_with("/api/admin/users/") => admin::delete_user_handler(req),
        ("PUT", p) if p.starts_with("/api/admin/users/") && p.ends_with("/role") => {
            admin::update_role_handler(req)
        }
        ("GET", "/") => Ok(Response::builder()
            .status(200)
            .header("Content-Type", "text/plain")
            .body("API is running...")
            .build()),
        _ => Ok(Response::builder()
            .status(404)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(
                &serde_json::json!({"message": "Not found"}),
            )?)
            .build()),
    }
}

#[cfg(target_arch = "wasm32")]
#[http_component]
fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
    route(req)
}
