//! Post repository for Agora.
//!
//! Posts, their like set and their reports live in three tables. Every
//! counter or set change is issued as a single statement or inside one write
//! transaction so concurrent requests cannot lose updates.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::types::{LikeOutcome, Post, Report};
use crate::db::SQL_NOW;
use crate::filter::Classification;
use crate::pagination::PageRequest;
use crate::{AgoraError, Result};

const POST_COLUMNS: &str = "id, content, author_id, topic_id, parent_post_id, level, \
     like_count, is_reported, is_deleted, deleted_at, deleted_by, is_moderated, \
     moderation_reason, created_at, updated_at";

/// Repository for post records.
pub struct PostRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostRepository<'a> {
    /// Create a new PostRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a post. Topic, parent and level must already be resolved.
    pub async fn create(
        &self,
        author_id: i64,
        topic_id: i64,
        parent_post_id: Option<i64>,
        level: i64,
        content: &str,
        classification: &Classification,
    ) -> Result<Post> {
        let result = sqlx::query(
            "INSERT INTO posts (content, author_id, topic_id, parent_post_id, level,
                                is_moderated, moderation_reason)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(content)
        .bind(author_id)
        .bind(topic_id)
        .bind(parent_post_id)
        .bind(level)
        .bind(classification.flagged)
        .bind(&classification.reason)
        .execute(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AgoraError::NotFound("Post".to_string()))
    }

    /// Get a post by ID with its likes and reports, including soft-deleted ones.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        match post {
            Some(post) => {
                let mut posts = vec![post];
                self.load_relations(&mut posts).await?;
                Ok(posts.pop())
            }
            None => Ok(None),
        }
    }

    /// Get a live (not soft-deleted) post by ID.
    pub async fn get_active(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.get_by_id(id).await?.filter(|p| !p.is_deleted))
    }

    /// Replace the content of a live post and stamp `updated_at`.
    ///
    /// A flagged classification marks the post moderated; a clean one leaves
    /// any existing flag alone. Returns None if the post is missing.
    pub async fn update_content(
        &self,
        id: i64,
        content: &str,
        classification: &Classification,
    ) -> Result<Option<Post>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE posts SET content = ");
        query.push_bind(content.to_string());
        if classification.flagged {
            query.push(", is_moderated = 1, moderation_reason = ");
            query.push_bind(classification.reason.clone());
        }
        query.push(format!(", updated_at = {SQL_NOW} WHERE is_deleted = 0 AND id = "));
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| AgoraError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Soft-delete a live post, recording who deleted it.
    ///
    /// Returns the owning topic ID, or None if the post was missing or
    /// already deleted. Only the caller that actually flipped the flag gets
    /// a topic ID back.
    pub async fn soft_delete(&self, id: i64, deleted_by: i64) -> Result<Option<i64>> {
        let topic_id: Option<i64> = sqlx::query_scalar(&format!(
            "UPDATE posts
             SET is_deleted = 1, deleted_at = {SQL_NOW}, deleted_by = ?
             WHERE id = ? AND is_deleted = 0
             RETURNING topic_id"
        ))
        .bind(deleted_by)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok(topic_id)
    }

    /// Soft-delete every live post in a topic. Returns the number of posts changed.
    pub async fn soft_delete_by_topic(&self, topic_id: i64, deleted_by: i64) -> Result<u64> {
        let result = sqlx::query(&format!(
            "UPDATE posts
             SET is_deleted = 1, deleted_at = {SQL_NOW}, deleted_by = ?
             WHERE topic_id = ? AND is_deleted = 0"
        ))
        .bind(deleted_by)
        .bind(topic_id)
        .execute(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Add or remove the user's like.
    ///
    /// Runs in one transaction that starts with a write, so the database
    /// lock is held from the first statement and two toggles by the same
    /// user serialise. `like_count` is recomputed from the like set.
    /// Returns None if the post is missing or deleted.
    pub async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<Option<LikeOutcome>> {
        let mut tx = self.pool.begin().await?;

        let live = sqlx::query("UPDATE posts SET like_count = like_count WHERE id = ? AND is_deleted = 0")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
        if live.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = ? AND user_id = ?")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let liked = if removed.rows_affected() == 0 {
            sqlx::query(
                "INSERT INTO post_likes (post_id, user_id) VALUES (?, ?)
                 ON CONFLICT (post_id, user_id) DO NOTHING",
            )
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
            true
        } else {
            false
        };

        let like_count: i64 = sqlx::query_scalar(
            "UPDATE posts
             SET like_count = (SELECT COUNT(*) FROM post_likes WHERE post_id = ?)
             WHERE id = ?
             RETURNING like_count",
        )
        .bind(post_id)
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(LikeOutcome { liked, like_count }))
    }

    /// File a report against a live post and mark it reported.
    ///
    /// Fails with `NotFound` for a missing or deleted post and with
    /// `DuplicateReport` if the user already has a report on it; in both
    /// cases nothing is changed.
    pub async fn add_report(&self, post_id: i64, reported_by: i64, reason: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let marked = sqlx::query("UPDATE posts SET is_reported = 1 WHERE id = ? AND is_deleted = 0")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
        if marked.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AgoraError::NotFound("Post".to_string()));
        }

        let inserted = sqlx::query(
            "INSERT INTO post_reports (post_id, reported_by, reason) VALUES (?, ?, ?)
             ON CONFLICT (post_id, reported_by) DO NOTHING",
        )
        .bind(post_id)
        .bind(reported_by)
        .bind(reason)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AgoraError::DuplicateReport);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Clear reports and the content flag on a live post.
    ///
    /// Returns false if the post is missing or deleted.
    pub async fn approve(&self, post_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let cleared = sqlx::query(
            "UPDATE posts SET is_reported = 0, is_moderated = 0, moderation_reason = ''
             WHERE id = ? AND is_deleted = 0",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?;
        if cleared.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM post_reports WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Page of live top-level posts in a topic, oldest first, with the
    /// total number of live top-level posts.
    pub async fn list_top_level(
        &self,
        topic_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<Post>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts
             WHERE topic_id = ? AND parent_post_id IS NULL AND is_deleted = 0",
        )
        .bind(topic_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        let mut posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE topic_id = ? AND parent_post_id IS NULL AND is_deleted = 0
             ORDER BY created_at ASC, id ASC
             LIMIT ? OFFSET ?"
        ))
        .bind(topic_id)
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        self.load_relations(&mut posts).await?;
        Ok((posts, total))
    }

    /// All live descendants of the given posts, at any depth, oldest first.
    ///
    /// A deleted post hides its whole subtree.
    pub async fn list_descendants(&self, root_ids: &[i64]) -> Result<Vec<Post>> {
        if root_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "WITH RECURSIVE tree(id) AS (
                 SELECT id FROM posts WHERE is_deleted = 0 AND parent_post_id IN (",
        );
        let mut ids = query.separated(", ");
        for id in root_ids {
            ids.push_bind(*id);
        }
        query.push(format!(
            ")
                 UNION
                 SELECT p.id FROM posts p JOIN tree t ON p.parent_post_id = t.id
                 WHERE p.is_deleted = 0
             )
             SELECT {POST_COLUMNS} FROM posts
             WHERE id IN (SELECT id FROM tree)
             ORDER BY created_at ASC, id ASC"
        ));

        let mut posts = query
            .build_query_as::<Post>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| AgoraError::Database(e.to_string()))?;

        self.load_relations(&mut posts).await?;
        Ok(posts)
    }

    /// Page of live reported posts, most recently reported first.
    pub async fn list_reported(&self, page: PageRequest) -> Result<(Vec<Post>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE is_reported = 1 AND is_deleted = 0",
        )
        .fetch_one(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        let mut posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE is_reported = 1 AND is_deleted = 0
             ORDER BY (SELECT MIN(reported_at) FROM post_reports WHERE post_id = posts.id) DESC,
                      id DESC
             LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        self.load_relations(&mut posts).await?;
        Ok((posts, total))
    }

    /// Fill `likes` and `reports` for a batch of posts with two queries.
    async fn load_relations(&self, posts: &mut [Post]) -> Result<()> {
        if posts.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT post_id, user_id FROM post_likes WHERE post_id IN (");
        let mut separated = query.separated(", ");
        for id in &ids {
            separated.push_bind(*id);
        }
        query.push(") ORDER BY created_at ASC, user_id ASC");
        let like_rows: Vec<(i64, i64)> = query
            .build_query_as()
            .fetch_all(self.pool)
            .await
            .map_err(|e| AgoraError::Database(e.to_string()))?;

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT post_id, reported_by, reason, reported_at FROM post_reports WHERE post_id IN (",
        );
        let mut separated = query.separated(", ");
        for id in &ids {
            separated.push_bind(*id);
        }
        query.push(") ORDER BY id ASC");
        let report_rows: Vec<(i64, i64, String, String)> = query
            .build_query_as()
            .fetch_all(self.pool)
            .await
            .map_err(|e| AgoraError::Database(e.to_string()))?;

        let mut likes: HashMap<i64, Vec<i64>> = HashMap::new();
        for (post_id, user_id) in like_rows {
            likes.entry(post_id).or_default().push(user_id);
        }
        let mut reports: HashMap<i64, Vec<Report>> = HashMap::new();
        for (post_id, reported_by, reason, reported_at) in report_rows {
            reports.entry(post_id).or_default().push(Report {
                reported_by,
                reason,
                reported_at,
            });
        }

        for post in posts.iter_mut() {
            post.likes = likes.remove(&post.id).unwrap_or_default();
            post.reports = reports.remove(&post.id).unwrap_or_default();
        }
        Ok(())
    }
}
