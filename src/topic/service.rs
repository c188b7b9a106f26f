//! Topic service for Agora.
//!
//! High-level topic operations with validation, content filtering and
//! permission checks. Storage goes through [`TopicRepository`].

use tracing::{error, info, warn};

use super::repository::TopicRepository;
use super::types::{normalize_tags, NewTopic, Topic, TopicFilter, TopicUpdate};
use crate::auth::{ensure_can_mutate, require_staff, Principal};
use crate::config::ForumConfig;
use crate::db::{Database, UserRepository};
use crate::filter::classify_first;
use crate::pagination::{Page, PageRequest};
use crate::post::PostRepository;
use crate::{AgoraError, Result};

/// Maximum length for topic titles (in characters).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for topic descriptions (in characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 20_000;

/// Maximum length for a category name (in characters).
pub const MAX_CATEGORY_LENGTH: usize = 50;

fn check_length(value: &str, max: usize, field: &str) -> Result<()> {
    if value.chars().count() > max {
        return Err(AgoraError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Service for topic operations.
pub struct TopicService<'a> {
    db: &'a Database,
    config: &'a ForumConfig,
}

impl<'a> TopicService<'a> {
    /// Create a new TopicService.
    pub fn new(db: &'a Database, config: &'a ForumConfig) -> Self {
        Self { db, config }
    }

    fn repo(&self) -> TopicRepository<'_> {
        TopicRepository::new(self.db.pool())
    }

    /// List live topics matching the filter.
    pub async fn list(&self, filter: &TopicFilter, page: PageRequest) -> Result<Page<Topic>> {
        let (items, total) = self.repo().list(filter, page).await?;
        Ok(Page::new(items, page, total))
    }

    /// Read a live topic, counting the view.
    pub async fn get(&self, id: i64) -> Result<Topic> {
        self.repo()
            .get_and_increment_views(id)
            .await?
            .ok_or_else(|| AgoraError::NotFound("Topic".to_string()))
    }

    /// Create a topic authored by the principal.
    ///
    /// Title and description are required; category falls back to the
    /// configured default. Flagged content is stored with `is_moderated` set.
    pub async fn create(&self, principal: &Principal, new_topic: NewTopic) -> Result<Topic> {
        let title = new_topic.title.trim().to_string();
        let description = new_topic.description.trim().to_string();
        if title.is_empty() || description.is_empty() {
            return Err(AgoraError::Validation(
                "Title and description are required".to_string(),
            ));
        }
        check_length(&title, MAX_TITLE_LENGTH, "Title")?;
        check_length(&description, MAX_DESCRIPTION_LENGTH, "Description")?;

        let category = new_topic
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.config.default_category.clone());
        check_length(&category, MAX_CATEGORY_LENGTH, "Category")?;

        let classification = classify_first(&[Some(title.as_str()), Some(description.as_str())]);
        let normalized = NewTopic {
            title,
            description,
            category: Some(category),
            tags: Some(normalize_tags(new_topic.tags.unwrap_or_default())),
        };

        let topic = self
            .repo()
            .create(principal.id, &normalized, &classification)
            .await?;

        if let Err(e) = UserRepository::new(self.db.pool())
            .increment_post_count(principal.id)
            .await
        {
            error!(user_id = principal.id, topic_id = topic.id, error = %e, "Failed to update author post count");
        }

        info!(
            topic_id = topic.id,
            author_id = principal.id,
            category = %topic.category,
            flagged = classification.flagged,
            "Topic created"
        );
        Ok(topic)
    }

    /// Edit a topic. Only the author or moderation staff may do so.
    ///
    /// Blank fields are ignored. Changing the title or description re-runs
    /// the content filter; a clean result does not clear an earlier flag.
    pub async fn update(&self, principal: &Principal, id: i64, update: TopicUpdate) -> Result<Topic> {
        let repo = self.repo();
        let topic = repo
            .get_active(id)
            .await?
            .ok_or_else(|| AgoraError::NotFound("Topic".to_string()))?;
        ensure_can_mutate(&topic, principal, "edit this topic")?;

        let update = update.normalized();
        if update.is_empty() {
            return Ok(topic);
        }
        if let Some(ref title) = update.title {
            check_length(title, MAX_TITLE_LENGTH, "Title")?;
        }
        if let Some(ref description) = update.description {
            check_length(description, MAX_DESCRIPTION_LENGTH, "Description")?;
        }
        if let Some(ref category) = update.category {
            check_length(category, MAX_CATEGORY_LENGTH, "Category")?;
        }

        let classification = update
            .touches_content()
            .then(|| classify_first(&[update.title.as_deref(), update.description.as_deref()]));

        let updated = repo
            .update(id, &update, classification.as_ref())
            .await?
            .ok_or_else(|| AgoraError::NotFound("Topic".to_string()))?;

        info!(topic_id = id, user_id = principal.id, "Topic updated");
        Ok(updated)
    }

    /// Soft-delete a topic and every live post in it.
    ///
    /// The post cascade runs after the topic flag is set and is not undone
    /// if it fails.
    pub async fn soft_delete(&self, principal: &Principal, id: i64) -> Result<()> {
        let repo = self.repo();
        let topic = repo
            .get_active(id)
            .await?
            .ok_or_else(|| AgoraError::NotFound("Topic".to_string()))?;
        ensure_can_mutate(&topic, principal, "delete this topic")?;

        if !repo.soft_delete(id).await? {
            return Err(AgoraError::NotFound("Topic".to_string()));
        }

        match PostRepository::new(self.db.pool())
            .soft_delete_by_topic(id, principal.id)
            .await
        {
            Ok(count) => {
                info!(topic_id = id, user_id = principal.id, posts = count, "Topic deleted")
            }
            Err(e) => {
                warn!(topic_id = id, error = %e, "Topic deleted but post cascade failed")
            }
        }
        Ok(())
    }

    /// Flip the lock flag. Moderators and admins only.
    pub async fn toggle_lock(&self, principal: &Principal, id: i64) -> Result<bool> {
        require_staff(principal)?;
        let locked = self
            .repo()
            .toggle_lock(id, principal.id)
            .await?
            .ok_or_else(|| AgoraError::NotFound("Topic".to_string()))?;

        info!(topic_id = id, moderator_id = principal.id, locked, "Topic lock toggled");
        Ok(locked)
    }

    /// Flip the pin flag. Moderators and admins only.
    pub async fn toggle_pin(&self, principal: &Principal, id: i64) -> Result<bool> {
        require_staff(principal)?;
        let pinned = self
            .repo()
            .toggle_pin(id, principal.id)
            .await?
            .ok_or_else(|| AgoraError::NotFound("Topic".to_string()))?;

        info!(topic_id = id, moderator_id = principal.id, pinned, "Topic pin toggled");
        Ok(pinned)
    }
}
