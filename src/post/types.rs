//! Post model types.

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::auth::Authored;
use crate::AgoraError;

/// A post within a topic, either top-level or a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Unique post ID.
    pub id: i64,
    /// Body text.
    pub content: String,
    /// Author user ID.
    pub author_id: i64,
    /// Owning topic ID.
    pub topic_id: i64,
    /// Parent post for replies.
    pub parent_post_id: Option<i64>,
    /// 0 for top-level posts, parent level + 1 otherwise.
    pub level: i64,
    /// Size of `likes`.
    pub like_count: i64,
    /// User IDs that liked the post, oldest first.
    pub likes: Vec<i64>,
    /// Whether the post has open reports.
    pub is_reported: bool,
    /// Open reports, oldest first.
    pub reports: Vec<Report>,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// When the post was deleted.
    pub deleted_at: Option<String>,
    /// Who deleted the post.
    pub deleted_by: Option<i64>,
    /// Flagged by the content filter.
    pub is_moderated: bool,
    /// Why the post was flagged.
    pub moderation_reason: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last edit timestamp.
    pub updated_at: String,
}

impl Post {
    /// Check if this post is a reply.
    pub fn is_reply(&self) -> bool {
        self.parent_post_id.is_some()
    }
}

impl Authored for Post {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

impl<'r> FromRow<'r, SqliteRow> for Post {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            content: row.try_get("content")?,
            author_id: row.try_get("author_id")?,
            topic_id: row.try_get("topic_id")?,
            parent_post_id: row.try_get("parent_post_id")?,
            level: row.try_get("level")?,
            like_count: row.try_get("like_count")?,
            likes: Vec::new(),
            is_reported: row.try_get("is_reported")?,
            reports: Vec::new(),
            is_deleted: row.try_get("is_deleted")?,
            deleted_at: row.try_get("deleted_at")?,
            deleted_by: row.try_get("deleted_by")?,
            is_moderated: row.try_get("is_moderated")?,
            moderation_reason: row.try_get("moderation_reason")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// A user's report against a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Reporting user ID.
    pub reported_by: i64,
    /// Free-text reason.
    pub reason: String,
    /// When the report was filed.
    pub reported_at: String,
}

/// Data for creating a new post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    /// Body text.
    pub content: String,
    /// Topic to post in.
    pub topic_id: Option<i64>,
    /// Post being replied to.
    pub parent_post_id: Option<i64>,
}

impl NewPost {
    /// Create a new top-level post.
    pub fn new(topic_id: i64, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            topic_id: Some(topic_id),
            parent_post_id: None,
        }
    }

    /// Create a reply to another post.
    pub fn reply(topic_id: i64, parent_post_id: i64, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            topic_id: Some(topic_id),
            parent_post_id: Some(parent_post_id),
        }
    }
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    /// Whether the user now likes the post.
    pub liked: bool,
    /// Like count after the toggle.
    pub like_count: i64,
}

/// Moderator decision on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    /// Clear reports and the content flag.
    Approve,
    /// Soft-delete the post.
    Delete,
}

impl ModerationAction {
    /// Get the action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Approve => "approve",
            ModerationAction::Delete => "delete",
        }
    }
}

impl FromStr for ModerationAction {
    type Err = AgoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ModerationAction::Approve),
            "delete" => Ok(ModerationAction::Delete),
            _ => Err(AgoraError::Validation("Invalid action".to_string())),
        }
    }
}

impl std::fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderation_action_from_str() {
        assert_eq!(
            "approve".parse::<ModerationAction>().unwrap(),
            ModerationAction::Approve
        );
        assert_eq!(
            "delete".parse::<ModerationAction>().unwrap(),
            ModerationAction::Delete
        );

        let err = "ban".parse::<ModerationAction>().unwrap_err();
        assert!(matches!(err, AgoraError::Validation(ref m) if m == "Invalid action"));
        assert!("Approve".parse::<ModerationAction>().is_err());
    }

    #[test]
    fn test_moderation_action_display() {
        assert_eq!(ModerationAction::Approve.to_string(), "approve");
        assert_eq!(ModerationAction::Delete.as_str(), "delete");
    }

    #[test]
    fn test_new_post_builders() {
        let post = NewPost::new(3, "hello");
        assert_eq!(post.topic_id, Some(3));
        assert!(post.parent_post_id.is_none());

        let reply = NewPost::reply(3, 7, "hi");
        assert_eq!(reply.parent_post_id, Some(7));
        assert_eq!(reply.content, "hi");
    }
}
