//! Authorization decisions. Authentication (token -> user) lives in
//! `auth`; everything here is a pure function over roles and ownership so
//! the whole table is visible in one place.

use crate::core::errors::ApiError;
use crate::models::models::{Post, Role, User};

/// Admin and owner may delete arbitrary users and posts.
pub fn can_moderate(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Owner)
}

/// Only the owner may change roles.
pub fn can_assign_roles(role: Role) -> bool {
    matches!(role, Role::Owner)
}

/// Roles grantable through the role-update path. Owner is never grantable.
pub fn assignable(role: Role) -> bool {
    matches!(role, Role::User | Role::Admin)
}

/// Who may delete whom. Exhaustive so a new role cannot silently fall
/// through to "allowed".
pub fn can_delete_user(requester: Role, target: Role) -> Result<(), ApiError> {
    match (requester, target) {
        (Role::User, _) => Err(ApiError::Authorization(
            "User role user is not authorized to access this route".to_string(),
        )),
        (Role::Admin, Role::Owner) => Err(ApiError::Authorization(
            "Not authorized to delete owner".to_string(),
        )),
        (Role::Admin, Role::User | Role::Admin) => Ok(()),
        (Role::Owner, _) => Ok(()),
    }
}

/// Post deletion: author, or moderator role.
pub fn can_delete_post(requester: &User, post: &Post) -> bool {
    post.author == requester.id || can_moderate(requester.role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::helpers::now_iso;

    fn user_with_role(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            username: id.to_string(),
            email: format!("{}@example.com", id),
            password: String::new(),
            role,
            following: vec![],
            followers: vec![],
            blocked_users: vec![],
            created_at: now_iso(),
        }
    }

    #[test]
    fn moderation_requires_elevated_role() {
        assert!(!can_moderate(Role::User));
        assert!(can_moderate(Role::Admin));
        assert!(can_moderate(Role::Owner));
    }

    #[test]
    fn only_owner_assigns_roles() {
        assert!(!can_assign_roles(Role::User));
        assert!(!can_assign_roles(Role::Admin));
        assert!(can_assign_roles(Role::Owner));
    }

    #[test]
    fn owner_is_not_assignable() {
        assert!(assignable(Role::User));
        assert!(assignable(Role::Admin));
        assert!(!assignable(Role::Owner));
    }

    #[test]
    fn admin_cannot_delete_owner() {
        assert!(matches!(
            can_delete_user(Role::Admin, Role::Owner),
            Err(ApiError::Authorization(_))
        ));
        assert!(can_delete_user(Role::Owner, Role::Owner).is_ok());
        assert!(can_delete_user(Role::Admin, Role::User).is_ok());
        assert!(matches!(
            can_delete_user(Role::User, Role::User),
            Err(ApiError::Authorization(_))
        ));
    }

    #[test]
    fn post_deletion_is_author_or_moderator() {
        let author = user_with_role("a", Role::User);
        let stranger = user_with_role("b", Role::User);
        let admin = user_with_role("c", Role::Admin);
        let post = Post {
            id: "p".to_string(),
            author: "a".to_string(),
            content: "hi".to_string(),
            likes: vec![],
            created_at: now_iso(),
        };

        assert!(can_delete_post(&author, &post));
        assert!(!can_delete_post(&stranger, &post));
        assert!(can_delete_post(&admin, &post));
    }
}
