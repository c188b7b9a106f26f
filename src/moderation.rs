//! Moderation queue.
//!
//! Read side over reported posts plus the approve/delete decision. Holds no
//! state of its own; everything goes through the post and topic repositories.

use crate::auth::Principal;
use crate::db::Database;
use crate::pagination::{Page, PageRequest};
use crate::post::{ModerationAction, Post, PostService};
use crate::topic::{TopicRef, TopicRepository};
use crate::Result;

/// A reported post together with the topic it belongs to.
#[derive(Debug, Clone)]
pub struct ReportedPost {
    /// The post, with its reports loaded.
    pub post: Post,
    /// Owning topic, if it still exists.
    pub topic: Option<TopicRef>,
}

/// Moderator view over reported posts.
pub struct ModerationQueue<'a> {
    db: &'a Database,
}

impl<'a> ModerationQueue<'a> {
    /// Create a new ModerationQueue with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Page of live reported posts, most recently reported first.
    pub async fn list_reported(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> Result<Page<ReportedPost>> {
        let posts = PostService::new(self.db)
            .list_reported(principal, page)
            .await?;

        let mut topic_ids: Vec<i64> = posts.items.iter().map(|p| p.topic_id).collect();
        topic_ids.sort_unstable();
        topic_ids.dedup();
        let topics = TopicRepository::new(self.db.pool())
            .get_refs(&topic_ids)
            .await?;

        Ok(posts.map(|post| ReportedPost {
            topic: topics.get(&post.topic_id).cloned(),
            post,
        }))
    }

    /// Approve or delete a post.
    pub async fn moderate(
        &self,
        principal: &Principal,
        post_id: i64,
        action: &str,
    ) -> Result<ModerationAction> {
        PostService::new(self.db)
            .moderate(principal, post_id, action)
            .await
    }
}
