//! Topic model types.

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::auth::Authored;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// A discussion topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    /// Unique topic ID.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Opening description.
    pub description: String,
    /// Author user ID.
    pub author_id: i64,
    /// Category name.
    pub category: String,
    /// Tags, unique, in insertion order.
    pub tags: Vec<String>,
    /// Number of detail reads.
    pub view_count: i64,
    /// Number of live posts (no floor).
    pub post_count: i64,
    /// Pinned topics sort first.
    pub is_pinned: bool,
    /// Locked topics only accept posts from moderators.
    pub is_locked: bool,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Flagged by the content filter.
    pub is_moderated: bool,
    /// Why the topic was flagged.
    pub moderation_reason: String,
    /// Last moderator to lock or pin.
    pub moderated_by: Option<i64>,
    /// Last time a post was added.
    pub last_activity: String,
    /// Author of the most recent post.
    pub last_post_by: Option<i64>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last edit timestamp.
    pub updated_at: String,
}

impl Authored for Topic {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

impl<'r> FromRow<'r, SqliteRow> for Topic {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let raw_tags: String = row.try_get("tags")?;
        let tags = serde_json::from_str(&raw_tags).map_err(|e| sqlx::Error::ColumnDecode {
            index: "tags".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            author_id: row.try_get("author_id")?,
            category: row.try_get("category")?,
            tags,
            view_count: row.try_get("view_count")?,
            post_count: row.try_get("post_count")?,
            is_pinned: row.try_get("is_pinned")?,
            is_locked: row.try_get("is_locked")?,
            is_deleted: row.try_get("is_deleted")?,
            is_moderated: row.try_get("is_moderated")?,
            moderation_reason: row.try_get("moderation_reason")?,
            moderated_by: row.try_get("moderated_by")?,
            last_activity: row.try_get("last_activity")?,
            last_post_by: row.try_get("last_post_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Minimal topic projection embedded in moderation listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct TopicRef {
    /// Topic ID.
    pub id: i64,
    /// Title.
    pub title: String,
}

/// Trim tags, drop empties and duplicates, keep first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Data for creating a new topic.
#[derive(Debug, Clone, Default)]
pub struct NewTopic {
    /// Title.
    pub title: String,
    /// Opening description.
    pub description: String,
    /// Category (defaults to the configured default category).
    pub category: Option<String>,
    /// Tags (defaults to none).
    pub tags: Option<Vec<String>>,
}

impl NewTopic {
    /// Create a new topic payload.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: None,
            tags: None,
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// Partial topic edit. Unset and blank fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TopicUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// Replacement tag set.
    pub tags: Option<Vec<String>>,
}

impl TopicUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Replace the tags.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Trim text fields, turn blank ones into "not supplied", normalise tags.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            title: clean(self.title),
            description: clean(self.description),
            category: clean(self.category),
            tags: self.tags.map(normalize_tags),
        }
    }

    /// Whether a text field the content filter looks at is being changed.
    pub fn touches_content(&self) -> bool {
        self.title.is_some() || self.description.is_some()
    }

    /// Check if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.tags.is_none()
    }
}

/// Listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring over title or description.
    pub search: Option<String>,
}

impl TopicFilter {
    /// Build a filter from raw query values.
    ///
    /// Blank values and the `All` category sentinel mean "no filter".
    pub fn from_params(category: Option<&str>, search: Option<&str>) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(str::to_string);
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self { category, search }
    }

    /// Filter on an exact category, with no sentinel handling.
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            search: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags([" rust ", "", "web", "rust", "  "]);
        assert_eq!(tags, vec!["rust", "web"]);
    }

    #[test]
    fn test_new_topic_builder() {
        let topic = NewTopic::new("Title", "Body")
            .with_category("Help")
            .with_tags(["a", "b"]);
        assert_eq!(topic.title, "Title");
        assert_eq!(topic.category.as_deref(), Some("Help"));
        assert_eq!(topic.tags, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_topic_update_normalized() {
        let update = TopicUpdate::new()
            .title("  New title ")
            .description("   ")
            .tags(["x", "x", " y"])
            .normalized();

        assert_eq!(update.title.as_deref(), Some("New title"));
        assert!(update.description.is_none());
        assert!(update.category.is_none());
        assert_eq!(update.tags, Some(vec!["x".to_string(), "y".to_string()]));
        assert!(update.touches_content());
        assert!(!update.is_empty());
    }

    #[test]
    fn test_topic_update_empty() {
        assert!(TopicUpdate::new().is_empty());
        assert!(TopicUpdate::new().title("  ").normalized().is_empty());
        assert!(!TopicUpdate::new().category("Help").touches_content());
    }

    #[test]
    fn test_filter_from_params() {
        assert_eq!(TopicFilter::from_params(None, None), TopicFilter::default());
        assert_eq!(
            TopicFilter::from_params(Some("All"), Some("  ")),
            TopicFilter::default()
        );

        let filter = TopicFilter::from_params(Some("Help"), Some(" rust "));
        assert_eq!(filter.category.as_deref(), Some("Help"));
        assert_eq!(filter.search.as_deref(), Some("rust"));
    }
}
