//! Topic repository for Agora.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::types::{NewTopic, Topic, TopicFilter, TopicRef, TopicUpdate};
use crate::db::SQL_NOW;
use crate::filter::Classification;
use crate::pagination::PageRequest;
use crate::{AgoraError, Result};

const TOPIC_COLUMNS: &str = "id, title, description, author_id, category, tags, view_count, \
     post_count, is_pinned, is_locked, is_deleted, is_moderated, moderation_reason, \
     moderated_by, last_activity, last_post_by, created_at, updated_at";

fn encode_tags(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).map_err(|e| AgoraError::Database(format!("encode tags: {e}")))
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &TopicFilter) {
    query.push(" WHERE is_deleted = 0");
    if let Some(ref category) = filter.category {
        query.push(" AND category = ");
        query.push_bind(category.clone());
    }
    if let Some(ref search) = filter.search {
        query.push(" AND (instr(lower(title), lower(");
        query.push_bind(search.clone());
        query.push(")) > 0 OR instr(lower(description), lower(");
        query.push_bind(search.clone());
        query.push(")) > 0)");
    }
}

/// Repository for topic records.
pub struct TopicRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TopicRepository<'a> {
    /// Create a new TopicRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a topic that has already been validated and normalised.
    pub async fn create(
        &self,
        author_id: i64,
        topic: &NewTopic,
        classification: &Classification,
    ) -> Result<Topic> {
        let tags = encode_tags(topic.tags.as_deref().unwrap_or_default())?;
        let category = topic.category.as_deref().unwrap_or("General");

        let result = sqlx::query(
            "INSERT INTO topics (title, description, author_id, category, tags,
                                 is_moderated, moderation_reason)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&topic.title)
        .bind(&topic.description)
        .bind(author_id)
        .bind(category)
        .bind(tags)
        .bind(classification.flagged)
        .bind(&classification.reason)
        .execute(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AgoraError::NotFound("Topic".to_string()))
    }

    /// Get a topic by ID, including soft-deleted ones.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Topic>> {
        let topic = sqlx::query_as::<_, Topic>(&format!(
            "SELECT {TOPIC_COLUMNS} FROM topics WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok(topic)
    }

    /// Get a live (not soft-deleted) topic by ID.
    pub async fn get_active(&self, id: i64) -> Result<Option<Topic>> {
        Ok(self.get_by_id(id).await?.filter(|t| !t.is_deleted))
    }

    /// Get ID/title references for a set of topics, deleted ones included.
    pub async fn get_refs(&self, ids: &[i64]) -> Result<HashMap<i64, TopicRef>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, title FROM topics WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let refs = query
            .build_query_as::<TopicRef>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok(refs.into_iter().map(|r| (r.id, r)).collect())
    }

    /// Increment the view counter of a live topic and return it.
    ///
    /// Increment and read happen in one statement, so concurrent readers
    /// never lose a view.
    pub async fn get_and_increment_views(&self, id: i64) -> Result<Option<Topic>> {
        let topic = sqlx::query_as::<_, Topic>(&format!(
            "UPDATE topics SET view_count = view_count + 1
             WHERE id = ? AND is_deleted = 0
             RETURNING {TOPIC_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok(topic)
    }

    /// List live topics, pinned first, then by most recent activity.
    ///
    /// Returns the page of topics and the total number of matches.
    pub async fn list(&self, filter: &TopicFilter, page: PageRequest) -> Result<(Vec<Topic>, i64)> {
        let mut count_query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM topics");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await
            .map_err(|e| AgoraError::Database(e.to_string()))?;

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {TOPIC_COLUMNS} FROM topics"));
        push_filter(&mut query, filter);
        query.push(" ORDER BY is_pinned DESC, last_activity DESC, id DESC LIMIT ");
        query.push_bind(i64::from(page.limit));
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let topics = query
            .build_query_as::<Topic>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok((topics, total))
    }

    /// Apply a normalised partial update to a live topic.
    ///
    /// A flagged classification marks the topic moderated; a clean one leaves
    /// any existing flag in place. Returns None if the topic is missing.
    pub async fn update(
        &self,
        id: i64,
        update: &TopicUpdate,
        classification: Option<&Classification>,
    ) -> Result<Option<Topic>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE topics SET ");
        let mut separated = query.separated(", ");

        if let Some(ref title) = update.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title.clone());
        }
        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }
        if let Some(ref category) = update.category {
            separated.push("category = ");
            separated.push_bind_unseparated(category.clone());
        }
        if let Some(ref tags) = update.tags {
            separated.push("tags = ");
            separated.push_bind_unseparated(encode_tags(tags)?);
        }
        if let Some(c) = classification.filter(|c| c.flagged) {
            separated.push("is_moderated = 1");
            separated.push("moderation_reason = ");
            separated.push_bind_unseparated(c.reason.clone());
        }
        separated.push(format!("updated_at = {SQL_NOW}"));

        query.push(" WHERE is_deleted = 0 AND id = ");
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

    /// Soft-delete a live topic. Returns false if it was missing or already deleted.
    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(&format!(
            "UPDATE topics SET is_deleted = 1, updated_at = {SQL_NOW}
             WHERE id = ? AND is_deleted = 0"
        ))
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip the lock flag, stamping the moderator. Returns the new state.
    pub async fn toggle_lock(&self, id: i64, moderator_id: i64) -> Result<Option<bool>> {
        self.toggle_flag("is_locked", id, moderator_id).await
    }

    /// Flip the pin flag, stamping the moderator. Returns the new state.
    pub async fn toggle_pin(&self, id: i64, moderator_id: i64) -> Result<Option<bool>> {
        self.toggle_flag("is_pinned", id, moderator_id).await
    }

    async fn toggle_flag(&self, column: &str, id: i64, moderator_id: i64) -> Result<Option<bool>> {
        let state: Option<bool> = sqlx::query_scalar(&format!(
            "UPDATE topics SET {column} = NOT {column}, moderated_by = ?
             WHERE id = ? AND is_deleted = 0
             RETURNING {column}"
        ))
        .bind(moderator_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok(state)
    }

    /// Record a new post: bump the counter and stamp the latest activity.
    pub async fn record_post(&self, id: i64, author_id: i64) -> Result<()> {
        let result = sqlx::query(&format!(
            "UPDATE topics
             SET post_count = post_count + 1, last_activity = {SQL_NOW}, last_post_by = ?
             WHERE id = ?"
        ))
        .bind(author_id)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AgoraError::NotFound("Topic".to_string()));
        }
        Ok(())
    }

    /// Atomically subtract one from the post counter. There is no floor at zero.
    pub async fn decrement_post_count(&self, id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE topics SET post_count = post_count - 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| AgoraError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AgoraError::NotFound("Topic".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::filter::classify;
    use crate::Database;

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();
        (db, user.id)
    }

    async fn create(repo: &TopicRepository<'_>, author: i64, title: &str, category: &str) -> Topic {
        let new_topic = NewTopic::new(title, format!("{title} description")).with_category(category);
        repo.create(author, &new_topic, &Classification::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_topic() {
        let (db, author) = setup().await;
        let repo = TopicRepository::new(db.pool());

        let new_topic = NewTopic::new("Hello", "World").with_tags(["rust", "sqlx"]);
        let topic = repo
            .create(author, &new_topic, &classify("World"))
            .await
            .unwrap();

        assert_eq!(topic.title, "Hello");
        assert_eq!(topic.author_id, author);
        assert_eq!(topic.category, "General");
        assert_eq!(topic.tags, vec!["rust", "sqlx"]);
        assert_eq!(topic.view_count, 0);
        assert_eq!(topic.post_count, 0);
        assert!(!topic.is_pinned && !topic.is_locked && !topic.is_deleted);
        assert!(!topic.is_moderated);
        assert!(topic.last_post_by.is_none());
    }

    #[tokio::test]
    async fn test_get_and_increment_views() {
        let (db, author) = setup().await;
        let repo = TopicRepository::new(db.pool());
        let topic = create(&repo, author, "Views", "General").await;

        let first = repo.get_and_increment_views(topic.id).await.unwrap().unwrap();
        assert_eq!(first.view_count, 1);
        let second = repo.get_and_increment_views(topic.id).await.unwrap().unwrap();
        assert_eq!(second.view_count, 2);

        assert!(repo.get_and_increment_views(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleted_topic_hidden() {
        let (db, author) = setup().await;
        let repo = TopicRepository::new(db.pool());
        let topic = create(&repo, author, "Gone", "General").await;

        assert!(repo.soft_delete(topic.id).await.unwrap());
        assert!(!repo.soft_delete(topic.id).await.unwrap());

        assert!(repo.get_active(topic.id).await.unwrap().is_none());
        assert!(repo.get_and_increment_views(topic.id).await.unwrap().is_none());
        let raw = repo.get_by_id(topic.id).await.unwrap().unwrap();
        assert!(raw.is_deleted);

        let (items, total) = repo
            .list(&TopicFilter::default(), PageRequest::new(1, 10))
            .await
            .unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_list_filter_and_search() {
        let (db, author) = setup().await;
        let repo = TopicRepository::new(db.pool());
        create(&repo, author, "Rust ownership", "Programming").await;
        create(&repo, author, "Gardening tips", "Hobbies").await;
        create(&repo, author, "Async RUST", "Programming").await;

        let (items, total) = repo
            .list(&TopicFilter::category("Programming"), PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(items.len(), 2);

        let search = TopicFilter::from_params(None, Some("rust"));
        let (items, total) = repo.list(&search, PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(total, 2);
        assert!(items.iter().all(|t| t.title.to_lowercase().contains("rust")));

        // Description matches too.
        let search = TopicFilter::from_params(None, Some("TIPS DESCRIPTION"));
        let (_, total) = repo.list(&search, PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_list_order_and_pagination() {
        let (db, author) = setup().await;
        let repo = TopicRepository::new(db.pool());
        let first = create(&repo, author, "First", "General").await;
        let second = create(&repo, author, "Second", "General").await;
        let third = create(&repo, author, "Third", "General").await;
        for (id, stamp) in [
            (first.id, "2024-01-01T00:00:00.000Z"),
            (second.id, "2024-01-02T00:00:00.000Z"),
            (third.id, "2024-01-03T00:00:00.000Z"),
        ] {
            sqlx::query("UPDATE topics SET last_activity = ? WHERE id = ?")
                .bind(stamp)
                .bind(id)
                .execute(db.pool())
                .await
                .unwrap();
        }

        // Activity on the first topic moves it ahead of the others.
        repo.record_post(first.id, author).await.unwrap();
        // Pinning the third keeps it on top regardless of activity.
        assert_eq!(repo.toggle_pin(third.id, author).await.unwrap(), Some(true));

        let (items, total) = repo
            .list(&TopicFilter::default(), PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(total, 3);
        let ids: Vec<i64> = items.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third.id, first.id]);

        let (items, _) = repo
            .list(&TopicFilter::default(), PageRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, second.id);
    }

    #[tokio::test]
    async fn test_update_topic() {
        let (db, author) = setup().await;
        let repo = TopicRepository::new(db.pool());
        let topic = create(&repo, author, "Original", "General").await;

        let update = TopicUpdate::new().title("Edited spam").tags(["a"]).normalized();
        let flag = classify("Edited spam");
        let updated = repo
            .update(topic.id, &update, Some(&flag))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Edited spam");
        assert_eq!(updated.description, topic.description);
        assert_eq!(updated.tags, vec!["a"]);
        assert!(updated.is_moderated);
        assert!(!updated.moderation_reason.is_empty());

        // A clean edit does not clear the flag.
        let update = TopicUpdate::new().title("Clean again").normalized();
        let updated = repo
            .update(topic.id, &update, Some(&classify("Clean again")))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.is_moderated);

        assert!(repo.update(999, &update, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_toggle_lock() {
        let (db, author) = setup().await;
        let repo = TopicRepository::new(db.pool());
        let topic = create(&repo, author, "Lockable", "General").await;

        assert_eq!(repo.toggle_lock(topic.id, author).await.unwrap(), Some(true));
        let locked = repo.get_by_id(topic.id).await.unwrap().unwrap();
        assert!(locked.is_locked);
        assert_eq!(locked.moderated_by, Some(author));

        assert_eq!(repo.toggle_lock(topic.id, author).await.unwrap(), Some(false));
        assert_eq!(repo.toggle_lock(999, author).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_post_counter_has_no_floor() {
        let (db, author) = setup().await;
        let repo = TopicRepository::new(db.pool());
        let topic = create(&repo, author, "Counter", "General").await;

        repo.record_post(topic.id, author).await.unwrap();
        let t = repo.get_by_id(topic.id).await.unwrap().unwrap();
        assert_eq!(t.post_count, 1);
        assert_eq!(t.last_post_by, Some(author));

        repo.decrement_post_count(topic.id).await.unwrap();
        repo.decrement_post_count(topic.id).await.unwrap();
        let t = repo.get_by_id(topic.id).await.unwrap().unwrap();
        assert_eq!(t.post_count, -1);

        assert!(repo.decrement_post_count(999).await.is_err());
    }
}
