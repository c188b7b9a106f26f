//! Role and ownership checks shared by topics and posts.

use super::identity::Principal;
use crate::db::Role;
use crate::{AgoraError, Result};

/// Anything with a single author that can be edited or removed.
pub trait Authored {
    /// ID of the user who created the entity.
    fn author_id(&self) -> i64;
}

/// Require the principal to hold one of the given roles.
///
/// # Examples
///
/// ```
/// use agora::auth::{require_role, STAFF_ROLES};
/// # use agora::auth::Principal;
/// # use agora::db::Role;
/// # let principal = Principal {
/// #     id: 1, username: "m".into(), email: "m@x".into(), role: Role::Moderator,
/// #     post_count: 0, reputation: 0, bio: String::new(), created_at: String::new(),
/// # };
/// assert!(require_role(&principal, STAFF_ROLES).is_ok());
/// ```
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(AgoraError::Forbidden(
            "Moderator access required".to_string(),
        ))
    }
}

/// Roles allowed to moderate.
pub const STAFF_ROLES: &[Role] = &[Role::Moderator, Role::Admin];

/// Require moderator or admin.
pub fn require_staff(principal: &Principal) -> Result<()> {
    require_role(principal, STAFF_ROLES)
}

/// True iff the principal authored the entity or is moderation staff.
pub fn can_mutate<E: Authored + ?Sized>(entity: &E, principal: &Principal) -> bool {
    entity.author_id() == principal.id || principal.role.is_staff()
}

/// [`can_mutate`] as a check that fails with `Forbidden`.
pub fn ensure_can_mutate<E: Authored + ?Sized>(
    entity: &E,
    principal: &Principal,
    action: &str,
) -> Result<()> {
    if can_mutate(entity, principal) {
        Ok(())
    } else {
        Err(AgoraError::Forbidden(format!("No permission to {action}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing(i64);

    impl Authored for Thing {
        fn author_id(&self) -> i64 {
            self.0
        }
    }

    fn principal(id: i64, role: Role) -> Principal {
        Principal {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            role,
            post_count: 0,
            reputation: 0,
            bio: String::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&principal(1, Role::Moderator), STAFF_ROLES).is_ok());
        assert!(require_role(&principal(1, Role::Admin), STAFF_ROLES).is_ok());
        assert!(matches!(
            require_role(&principal(1, Role::User), STAFF_ROLES),
            Err(AgoraError::Forbidden(_))
        ));
        assert!(require_role(&principal(1, Role::Moderator), &[Role::Admin]).is_err());
    }

    #[test]
    fn test_require_staff() {
        assert!(require_staff(&principal(1, Role::User)).is_err());
        assert!(require_staff(&principal(1, Role::Admin)).is_ok());
    }

    #[test]
    fn test_can_mutate_owner() {
        assert!(can_mutate(&Thing(5), &principal(5, Role::User)));
    }

    #[test]
    fn test_can_mutate_other_user() {
        assert!(!can_mutate(&Thing(5), &principal(6, Role::User)));
    }

    #[test]
    fn test_can_mutate_staff() {
        assert!(can_mutate(&Thing(5), &principal(6, Role::Moderator)));
        assert!(can_mutate(&Thing(5), &principal(6, Role::Admin)));
    }

    #[test]
    fn test_ensure_can_mutate_message() {
        let err = ensure_can_mutate(&Thing(5), &principal(6, Role::User), "edit this post")
            .unwrap_err();
        match err {
            AgoraError::Forbidden(msg) => assert_eq!(msg, "No permission to edit this post"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
