//! User model for Agora.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use thiserror::Error;

/// Role tier of a user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member.
    #[default]
    User,
    /// Moderator.
    Moderator,
    /// Administrator.
    Admin,
}

/// Error returned when a stored or supplied role name is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    /// Convert role to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    /// Whether this role belongs to the moderation staff (moderator or admin).
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }

    /// Check if this role has at least the required tier.
    ///
    /// # Examples
    ///
    /// ```
    /// use agora::db::Role;
    ///
    /// assert!(Role::Admin.can_access(Role::Moderator));
    /// assert!(Role::Moderator.can_access(Role::Moderator));
    /// assert!(!Role::User.can_access(Role::Moderator));
    /// ```
    pub fn can_access(&self, required: Role) -> bool {
        *self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Decode the `role` column of a row.
pub(crate) fn decode_role(row: &SqliteRow, column: &str) -> sqlx::Result<Role> {
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: UnknownRole| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Display name (unique, case-insensitive).
    pub username: String,
    /// Email address (unique, case-insensitive).
    pub email: String,
    /// Password hash (Argon2).
    pub password: String,
    /// Role tier.
    pub role: Role,
    /// Number of topics and posts created.
    pub post_count: i64,
    /// Reputation score.
    pub reputation: i64,
    /// Self-introduction.
    pub bio: String,
    /// Account creation timestamp.
    pub created_at: String,
}

impl User {
    /// Check if this user has at least the required role tier.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.can_access(required)
    }

    /// Lightweight reference used when embedding the author of an entity.
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

impl<'r> FromRow<'r, SqliteRow> for User {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            role: decode_role(row, "role")?,
            post_count: row.try_get("post_count")?,
            reputation: row.try_get("reputation")?,
            bio: row.try_get("bio")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Public projection of a user embedded in topic and post responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRef {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Role tier.
    pub role: Role,
}

impl<'r> FromRow<'r, SqliteRow> for UserRef {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            role: decode_role(row, "role")?,
        })
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password hash (should be pre-hashed with Argon2).
    pub password: String,
    /// Role tier (defaults to User).
    pub role: Role,
}

impl NewUser {
    /// Create a new user with the default role.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role: Role::User,
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Partial update of a user. Only set fields are written.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New role tier.
    pub role: Option<Role>,
    /// New bio.
    pub bio: Option<String>,
    /// New reputation score.
    pub reputation: Option<i64>,
}

impl UserUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the role.
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the bio.
    pub fn bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// Set the reputation.
    pub fn reputation(mut self, reputation: i64) -> Self {
        self.reputation = Some(reputation);
        self
    }

    /// Check if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.bio.is_none() && self.reputation.is_none()
    }
}
