//! Post service for Agora.
//!
//! Creation, editing and deletion of posts, the like toggle, reports and
//! moderator decisions. Secondary counter updates on topics and users are
//! logged when they fail but never turn a successful operation into an error.

use tracing::{error, info};

use super::repository::PostRepository;
use super::thread::{build_tree, ThreadNode};
use super::types::{LikeOutcome, ModerationAction, NewPost, Post};
use crate::auth::{ensure_can_mutate, require_staff, Principal};
use crate::db::{Database, UserRepository};
use crate::filter::classify;
use crate::pagination::{Page, PageRequest};
use crate::topic::TopicRepository;
use crate::{AgoraError, Result};

/// Maximum length for post content (in characters).
pub const MAX_CONTENT_LENGTH: usize = 20_000;

/// Maximum length for a report reason (in characters).
pub const MAX_REASON_LENGTH: usize = 500;

fn post_not_found() -> AgoraError {
    AgoraError::NotFound("Post".to_string())
}

/// Service for post operations.
pub struct PostService<'a> {
    db: &'a Database,
}

impl<'a> PostService<'a> {
    /// Create a new PostService with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn repo(&self) -> PostRepository<'_> {
        PostRepository::new(self.db.pool())
    }

    /// Page of top-level posts in a topic, each with its full reply tree.
    ///
    /// Totals count top-level posts only.
    pub async fn list_by_topic(&self, topic_id: i64, page: PageRequest) -> Result<Page<ThreadNode>> {
        let repo = self.repo();
        let (roots, total) = repo.list_top_level(topic_id, page).await?;
        let root_ids: Vec<i64> = roots.iter().map(|p| p.id).collect();
        let descendants = repo.list_descendants(&root_ids).await?;

        Ok(Page::new(build_tree(roots, descendants), page, total))
    }

    /// Create a post or reply as the principal.
    ///
    /// Locked topics only accept posts from moderators and admins. A reply's
    /// level is one deeper than its parent's.
    pub async fn create(&self, principal: &Principal, new_post: NewPost) -> Result<Post> {
        let content = new_post.content.trim();
        let topic_id = match new_post.topic_id {
            Some(id) if !content.is_empty() => id,
            _ => {
                return Err(AgoraError::Validation(
                    "Content and topic ID are required".to_string(),
                ))
            }
        };
        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(AgoraError::Validation(format!(
                "Content must be at most {MAX_CONTENT_LENGTH} characters"
            )));
        }

        let topics = TopicRepository::new(self.db.pool());
        let topic = topics
            .get_active(topic_id)
            .await?
            .ok_or_else(|| AgoraError::NotFound("Topic".to_string()))?;
        if topic.is_locked && !principal.is_staff() {
            return Err(AgoraError::Forbidden(
                "This topic is locked and cannot be replied to".to_string(),
            ));
        }

        let repo = self.repo();
        let level = match new_post.parent_post_id {
            Some(parent_id) => {
                let parent = repo
                    .get_active(parent_id)
                    .await?
                    .ok_or_else(|| AgoraError::NotFound("Parent post".to_string()))?;
                if parent.topic_id != topic.id {
                    return Err(AgoraError::Validation(
                        "Parent post belongs to a different topic".to_string(),
                    ));
                }
                parent.level + 1
            }
            None => 0,
        };

        let classification = classify(content);
        let post = repo
            .create(
                principal.id,
                topic.id,
                new_post.parent_post_id,
                level,
                content,
                &classification,
            )
            .await?;

        if let Err(e) = topics.record_post(topic.id, principal.id).await {
            error!(topic_id = topic.id, post_id = post.id, error = %e, "Failed to update topic activity");
        }
        if let Err(e) = UserRepository::new(self.db.pool())
            .increment_post_count(principal.id)
            .await
        {
            error!(user_id = principal.id, post_id = post.id, error = %e, "Failed to update author post count");
        }

        info!(
            post_id = post.id,
            topic_id = topic.id,
            author_id = principal.id,
            level,
            flagged = classification.flagged,
            "Post created"
        );
        Ok(post)
    }

    /// Replace a post's content. Only the author or moderation staff may do so.
    pub async fn update(&self, principal: &Principal, id: i64, content: &str) -> Result<Post> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AgoraError::Validation("Content is required".to_string()));
        }
        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(AgoraError::Validation(format!(
                "Content must be at most {MAX_CONTENT_LENGTH} characters"
            )));
        }

        let repo = self.repo();
        let post = repo.get_active(id).await?.ok_or_else(post_not_found)?;
        ensure_can_mutate(&post, principal, "edit this post")?;

        let updated = repo
            .update_content(id, content, &classify(content))
            .await?
            .ok_or_else(post_not_found)?;

        info!(post_id = id, user_id = principal.id, "Post updated");
        Ok(updated)
    }

    /// Soft-delete a post. Only the author or moderation staff may do so.
    pub async fn soft_delete(&self, principal: &Principal, id: i64) -> Result<()> {
        let post = self.repo().get_active(id).await?.ok_or_else(post_not_found)?;
        ensure_can_mutate(&post, principal, "delete this post")?;
        self.remove(principal, id).await
    }

    /// Flag the post deleted and take it off the topic's post count.
    async fn remove(&self, principal: &Principal, id: i64) -> Result<()> {
        let topic_id = self
            .repo()
            .soft_delete(id, principal.id)
            .await?
            .ok_or_else(post_not_found)?;

        if let Err(e) = TopicRepository::new(self.db.pool())
            .decrement_post_count(topic_id)
            .await
        {
            error!(topic_id, post_id = id, error = %e, "Failed to update topic post count");
        }

        info!(post_id = id, topic_id, user_id = principal.id, "Post deleted");
        Ok(())
    }

    /// Like the post, or take the like back if the principal already liked it.
    pub async fn toggle_like(&self, principal: &Principal, id: i64) -> Result<LikeOutcome> {
        self.repo()
            .toggle_like(id, principal.id)
            .await?
            .ok_or_else(post_not_found)
    }

    /// Report a post. Each user may report a given post once.
    pub async fn report(&self, principal: &Principal, id: i64, reason: &str) -> Result<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AgoraError::Validation(
                "Report reason is required".to_string(),
            ));
        }
        if reason.chars().count() > MAX_REASON_LENGTH {
            return Err(AgoraError::Validation(format!(
                "Report reason must be at most {MAX_REASON_LENGTH} characters"
            )));
        }

        self.repo().add_report(id, principal.id, reason).await?;
        info!(post_id = id, reported_by = principal.id, "Post reported");
        Ok(())
    }

    /// Apply a moderator decision named by `action` ("approve" or "delete").
    pub async fn moderate(&self, principal: &Principal, id: i64, action: &str) -> Result<ModerationAction> {
        require_staff(principal)?;
        self.repo().get_active(id).await?.ok_or_else(post_not_found)?;
        let action: ModerationAction = action.parse()?;

        match action {
            ModerationAction::Approve => {
                if !self.repo().approve(id).await? {
                    return Err(post_not_found());
                }
            }
            ModerationAction::Delete => self.remove(principal, id).await?,
        }

        info!(post_id = id, moderator_id = principal.id, %action, "Post moderated");
        Ok(action)
    }

    /// Page of live reported posts, most recently reported first.
    pub async fn list_reported(&self, principal: &Principal, page: PageRequest) -> Result<Page<Post>> {
        require_staff(principal)?;
        let (items, total) = self.repo().list_reported(page).await?;
        Ok(Page::new(items, page, total))
    }
}
