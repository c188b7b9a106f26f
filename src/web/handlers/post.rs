//! Post and moderation handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::moderation::ModerationQueue;
use crate::pagination::PageRequest;
use crate::post::{ModerationAction, Post, PostService, ThreadNode};
use crate::web::dto::{
    CreatePostRequest, IdPath, LikeResponse, MessageResponse, ModerateRequest, PageQuery,
    PostInfo, PostListResponse, PostResponse, ReportRequest, ReportedListResponse,
    ReportedPostInfo, UpdatePostRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

fn collect_authors(node: &ThreadNode, out: &mut Vec<i64>) {
    out.push(node.post.author_id);
    for reply in &node.replies {
        collect_authors(reply, out);
    }
}

impl AppState {
    async fn post_info(&self, post: Post) -> Result<PostInfo, ApiError> {
        let users = self.user_refs([post.author_id]).await?;
        Ok(PostInfo::new(post, &users, None))
    }
}

/// GET /api/posts/topic/:topicId - Top-level posts of a topic with nested replies.
pub async fn list_posts_by_topic(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    IdPath(topic_id): IdPath,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let page = PageRequest::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        state.forum.posts_page_size,
        state.forum.max_page_size,
    );
    let threads = PostService::new(&state.db)
        .list_by_topic(topic_id, page)
        .await?;

    let mut author_ids = Vec::new();
    for node in &threads.items {
        collect_authors(node, &mut author_ids);
    }
    let users = state.user_refs(author_ids).await?;

    let page = threads.map(|node| PostInfo::from_node(node, &users, viewer.as_ref()));
    Ok(Json(PostListResponse::new(page)))
}

/// POST /api/posts - Create a post or reply.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedJson(req): ValidatedJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let post = PostService::new(&state.db)
        .create(&principal, req.into())
        .await?;
    let flagged = post.is_moderated;
    let post = state.post_info(post).await?;

    let message = if flagged {
        "Post created but flagged for moderation"
    } else {
        "Post created successfully"
    };
    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            success: true,
            message: message.to_string(),
            post,
            flagged: Some(flagged),
        }),
    ))
}

/// PUT /api/posts/:id - Edit a post.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = PostService::new(&state.db)
        .update(&principal, id, &req.content)
        .await?;
    let post = state.post_info(post).await?;

    Ok(Json(PostResponse {
        success: true,
        message: "Post updated successfully".to_string(),
        post,
        flagged: None,
    }))
}

/// DELETE /api/posts/:id - Soft-delete a post.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    PostService::new(&state.db)
        .soft_delete(&principal, id)
        .await?;
    Ok(Json(MessageResponse::new("Post deleted successfully")))
}

/// POST /api/posts/:id/like - Toggle the caller's like.
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<LikeResponse>, ApiError> {
    let outcome = PostService::new(&state.db)
        .toggle_like(&principal, id)
        .await?;
    let message = if outcome.liked { "Post liked" } else { "Post unliked" };

    Ok(Json(LikeResponse {
        success: true,
        message: message.to_string(),
        liked: outcome.liked,
        like_count: outcome.like_count,
    }))
}

/// POST /api/posts/:id/report - Report a post to moderators.
pub async fn report_post(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<ReportRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    PostService::new(&state.db)
        .report(&principal, id, &req.reason)
        .await?;
    Ok(Json(MessageResponse::new(
        "Post reported successfully. Moderators will review it.",
    )))
}

/// GET /api/posts/reported - Moderation queue.
pub async fn list_reported(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<ReportedListResponse>, ApiError> {
    let page = PageRequest::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        state.forum.reported_page_size,
        state.forum.max_page_size,
    );
    let reported = ModerationQueue::new(&state.db)
        .list_reported(&principal, page)
        .await?;

    let user_ids = reported.items.iter().flat_map(|item| {
        std::iter::once(item.post.author_id)
            .chain(item.post.reports.iter().map(|r| r.reported_by))
    });
    let users = state.user_refs(user_ids.collect::<Vec<_>>()).await?;

    let page = reported.map(|item| ReportedPostInfo::new(item, &users));
    Ok(Json(ReportedListResponse::new(page)))
}

/// PATCH /api/posts/:id/moderate - Approve or delete a post.
pub async fn moderate_post(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<ModerateRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let action = ModerationQueue::new(&state.db)
        .moderate(&principal, id, &req.action)
        .await?;

    let message = match action {
        ModerationAction::Approve => "Post approved successfully",
        ModerationAction::Delete => "Post deleted successfully",
    };
    Ok(Json(MessageResponse::new(message)))
}
