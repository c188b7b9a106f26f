//! Topic handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::auth::Principal;
use crate::pagination::{Page, PageRequest};
use crate::topic::{Topic, TopicFilter, TopicService};
use crate::web::dto::{
    CreateTopicRequest, IdPath, LockState, MessageResponse, PageQuery, PinState, ToggleResponse,
    TopicInfo, TopicListQuery, TopicListResponse, TopicResponse, UpdateTopicRequest,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

impl AppState {
    fn topics(&self) -> TopicService<'_> {
        TopicService::new(&self.db, &self.forum)
    }

    fn topic_page(&self, page: Option<&str>, limit: Option<&str>) -> PageRequest {
        PageRequest::parse(page, limit, self.forum.topics_page_size, self.forum.max_page_size)
    }

    async fn topic_info(
        &self,
        topic: Topic,
        viewer: Option<&Principal>,
    ) -> Result<TopicInfo, ApiError> {
        let users = self.user_refs(TopicInfo::user_ids(&topic)).await?;
        Ok(TopicInfo::new(topic, &users, viewer))
    }

    async fn topic_list(
        &self,
        filter: TopicFilter,
        page: PageRequest,
    ) -> Result<TopicListResponse, ApiError> {
        let topics = self.topics().list(&filter, page).await?;
        let users = self
            .user_refs(topics.items.iter().flat_map(TopicInfo::user_ids))
            .await?;
        let page: Page<TopicInfo> = topics.map(|t| TopicInfo::new(t, &users, None));
        Ok(TopicListResponse::new(page))
    }
}

/// GET /api/topics - List topics.
pub async fn list_topics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopicListQuery>,
) -> Result<Json<TopicListResponse>, ApiError> {
    let page = state.topic_page(query.page.as_deref(), query.limit.as_deref());
    let filter = TopicFilter::from_params(query.category.as_deref(), query.search.as_deref());
    Ok(Json(state.topic_list(filter, page).await?))
}

/// GET /api/topics/category/:category - List topics in one category.
pub async fn list_topics_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<TopicListResponse>, ApiError> {
    let page = state.topic_page(query.page.as_deref(), query.limit.as_deref());
    let filter = TopicFilter::category(category);
    Ok(Json(state.topic_list(filter, page).await?))
}

/// GET /api/topics/:id - Get a topic, counting the view.
pub async fn get_topic(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    IdPath(id): IdPath,
) -> Result<Json<TopicResponse>, ApiError> {
    let topic = state.topics().get(id).await?;
    let topic = state.topic_info(topic, viewer.as_ref()).await?;

    Ok(Json(TopicResponse {
        success: true,
        message: None,
        topic,
        flagged: None,
    }))
}

/// POST /api/topics - Create a topic.
pub async fn create_topic(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateTopicRequest>,
) -> Result<(StatusCode, Json<TopicResponse>), ApiError> {
    let topic = state.topics().create(&principal, req.into()).await?;
    let flagged = topic.is_moderated;
    let topic = state.topic_info(topic, Some(&principal)).await?;

    let message = if flagged {
        "Topic created but flagged for moderation"
    } else {
        "Topic created successfully"
    };
    Ok((
        StatusCode::CREATED,
        Json(TopicResponse {
            success: true,
            message: Some(message.to_string()),
            topic,
            flagged: Some(flagged),
        }),
    ))
}

/// PUT /api/topics/:id - Edit a topic.
pub async fn update_topic(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<UpdateTopicRequest>,
) -> Result<Json<TopicResponse>, ApiError> {
    let topic = state.topics().update(&principal, id, req.into()).await?;
    let topic = state.topic_info(topic, Some(&principal)).await?;

    Ok(Json(TopicResponse {
        success: true,
        message: Some("Topic updated".to_string()),
        topic,
        flagged: None,
    }))
}

/// DELETE /api/topics/:id - Soft-delete a topic and its posts.
pub async fn delete_topic(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    state.topics().soft_delete(&principal, id).await?;
    Ok(Json(MessageResponse::new("Topic deleted")))
}

/// PATCH /api/topics/:id/lock - Toggle the lock flag.
pub async fn toggle_lock(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<ToggleResponse<LockState>>, ApiError> {
    let is_locked = state.topics().toggle_lock(&principal, id).await?;
    let message = if is_locked { "Topic locked" } else { "Topic unlocked" };

    Ok(Json(ToggleResponse {
        success: true,
        message: message.to_string(),
        topic: LockState { is_locked },
    }))
}

/// PATCH /api/topics/:id/pin - Toggle the pin flag.
pub async fn toggle_pin(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<ToggleResponse<PinState>>, ApiError> {
    let is_pinned = state.topics().toggle_pin(&principal, id).await?;
    let message = if is_pinned { "Topic pinned" } else { "Topic unpinned" };

    Ok(Json(ToggleResponse {
        success: true,
        message: message.to_string(),
        topic: PinState { is_pinned },
    }))
}
