//! Response DTOs for the REST API.
//!
//! Entities are serialised camelCase with their authors embedded as
//! `{id, username, role}`. Every envelope carries `success: true`.

use std::collections::HashMap;

use serde::Serialize;

use crate::auth::{can_mutate, Principal};
use crate::db::UserRef;
use crate::moderation::ReportedPost;
use crate::pagination::Page;
use crate::post::{Post, Report, ThreadNode};
use crate::topic::{Topic, TopicRef};

/// Resolved user references keyed by user ID.
pub type UserRefs = HashMap<i64, UserRef>;

// ============================================================================
// Entities
// ============================================================================

/// Topic as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInfo {
    /// Topic ID.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Opening description.
    pub description: String,
    /// Author.
    pub author: Option<UserRef>,
    /// Category.
    pub category: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Detail reads.
    pub view_count: i64,
    /// Live posts.
    pub post_count: i64,
    /// Pinned flag.
    pub is_pinned: bool,
    /// Locked flag.
    pub is_locked: bool,
    /// Flagged by the content filter.
    pub is_moderated: bool,
    /// Why it was flagged.
    pub moderation_reason: String,
    /// Last post time.
    pub last_activity: String,
    /// Author of the last post.
    pub last_post_by: Option<UserRef>,
    /// Creation time.
    pub created_at: String,
    /// Last edit time.
    pub updated_at: String,
    /// Whether the viewer may edit or delete; only present for signed-in viewers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_edit: Option<bool>,
}

impl TopicInfo {
    /// Build the client view of a topic.
    pub fn new(topic: Topic, users: &UserRefs, viewer: Option<&Principal>) -> Self {
        let can_edit = viewer.map(|p| can_mutate(&topic, p));
        Self {
            author: users.get(&topic.author_id).cloned(),
            last_post_by: topic.last_post_by.and_then(|id| users.get(&id).cloned()),
            id: topic.id,
            title: topic.title,
            description: topic.description,
            category: topic.category,
            tags: topic.tags,
            view_count: topic.view_count,
            post_count: topic.post_count,
            is_pinned: topic.is_pinned,
            is_locked: topic.is_locked,
            is_moderated: topic.is_moderated,
            moderation_reason: topic.moderation_reason,
            last_activity: topic.last_activity,
            created_at: topic.created_at,
            updated_at: topic.updated_at,
            can_edit,
        }
    }

    /// User IDs a topic needs resolved.
    pub fn user_ids(topic: &Topic) -> impl Iterator<Item = i64> {
        std::iter::once(topic.author_id).chain(topic.last_post_by)
    }
}

/// Post as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInfo {
    /// Post ID.
    pub id: i64,
    /// Body text.
    pub content: String,
    /// Author.
    pub author: Option<UserRef>,
    /// Owning topic ID.
    pub topic_id: i64,
    /// Parent post ID for replies.
    pub parent_post_id: Option<i64>,
    /// Nesting depth.
    pub level: i64,
    /// IDs of users who liked the post.
    pub likes: Vec<i64>,
    /// Number of likes.
    pub like_count: i64,
    /// Open reports exist.
    pub is_reported: bool,
    /// Flagged by the content filter.
    pub is_moderated: bool,
    /// Why it was flagged.
    pub moderation_reason: String,
    /// Creation time.
    pub created_at: String,
    /// Last edit time.
    pub updated_at: String,
    /// Whether the viewer liked the post; only present for signed-in viewers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    /// Whether the viewer may edit or delete; only present for signed-in viewers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_edit: Option<bool>,
    /// Nested replies; only present in thread listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<PostInfo>>,
}

impl PostInfo {
    /// Build the client view of a single post.
    pub fn new(post: Post, users: &UserRefs, viewer: Option<&Principal>) -> Self {
        let is_liked = viewer.map(|p| post.likes.contains(&p.id));
        let can_edit = viewer.map(|p| can_mutate(&post, p));
        Self {
            author: users.get(&post.author_id).cloned(),
            id: post.id,
            content: post.content,
            topic_id: post.topic_id,
            parent_post_id: post.parent_post_id,
            level: post.level,
            likes: post.likes,
            like_count: post.like_count,
            is_reported: post.is_reported,
            is_moderated: post.is_moderated,
            moderation_reason: post.moderation_reason,
            created_at: post.created_at,
            updated_at: post.updated_at,
            is_liked,
            can_edit,
            replies: None,
        }
    }

    /// Build the client view of a post and all its replies.
    pub fn from_node(node: ThreadNode, users: &UserRefs, viewer: Option<&Principal>) -> Self {
        let replies = node
            .replies
            .into_iter()
            .map(|child| PostInfo::from_node(child, users, viewer))
            .collect();
        let mut info = PostInfo::new(node.post, users, viewer);
        info.replies = Some(replies);
        info
    }
}

/// Reporter reference.
#[derive(Debug, Serialize)]
pub struct ReporterInfo {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
}

/// A report as shown to moderators.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInfo {
    /// Who reported the post.
    pub reported_by: Option<ReporterInfo>,
    /// Why.
    pub reason: String,
    /// When.
    pub reported_at: String,
}

impl ReportInfo {
    fn new(report: Report, users: &UserRefs) -> Self {
        Self {
            reported_by: users.get(&report.reported_by).map(|u| ReporterInfo {
                id: u.id,
                username: u.username.clone(),
            }),
            reason: report.reason,
            reported_at: report.reported_at,
        }
    }
}

/// A reported post as shown in the moderation queue.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedPostInfo {
    /// The post.
    #[serde(flatten)]
    pub post: PostInfo,
    /// Topic the post belongs to.
    pub topic: Option<TopicRef>,
    /// Open reports, oldest first.
    pub reports: Vec<ReportInfo>,
}

impl ReportedPostInfo {
    /// Build the moderator view of a reported post.
    pub fn new(mut item: ReportedPost, users: &UserRefs) -> Self {
        let reports = std::mem::take(&mut item.post.reports)
            .into_iter()
            .map(|r| ReportInfo::new(r, users))
            .collect();
        Self {
            post: PostInfo::new(item.post, users, None),
            topic: item.topic,
            reports,
        }
    }
}

// ============================================================================
// Envelopes
// ============================================================================

/// Plain success message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Always true.
    pub success: bool,
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Create a success message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Register/login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Always true.
    pub success: bool,
    /// Message.
    pub message: String,
    /// Bearer token.
    pub token: String,
    /// The account.
    pub user: Principal,
}

/// Token verification response.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// Always true.
    pub success: bool,
    /// Always true; invalid tokens get a 401 instead.
    pub valid: bool,
    /// The account behind the token.
    pub user: Principal,
}

/// Current user response.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// Always true.
    pub success: bool,
    /// The account.
    pub user: Principal,
}

/// Topic listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicListResponse {
    /// Always true.
    pub success: bool,
    /// Topics on this page.
    pub topics: Vec<TopicInfo>,
    /// Requested page.
    pub current_page: u32,
    /// Number of pages.
    pub total_pages: i64,
    /// Matching topics across all pages.
    pub total_topics: i64,
    /// Whether a later page exists.
    pub has_more: bool,
}

impl TopicListResponse {
    /// Wrap a page of topics.
    pub fn new(page: Page<TopicInfo>) -> Self {
        Self {
            success: true,
            current_page: page.page,
            total_pages: page.total_pages(),
            total_topics: page.total,
            has_more: page.has_more(),
            topics: page.items,
        }
    }
}

/// Single topic, optionally with a message.
#[derive(Debug, Serialize)]
pub struct TopicResponse {
    /// Always true.
    pub success: bool,
    /// Message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The topic.
    pub topic: TopicInfo,
    /// Whether the content filter flagged it; only on creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flagged: Option<bool>,
}

/// Lock toggle result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockState {
    /// New lock state.
    pub is_locked: bool,
}

/// Pin toggle result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinState {
    /// New pin state.
    pub is_pinned: bool,
}

/// Lock or pin toggle response.
#[derive(Debug, Serialize)]
pub struct ToggleResponse<T: Serialize> {
    /// Always true.
    pub success: bool,
    /// Message.
    pub message: String,
    /// New state.
    pub topic: T,
}

/// Thread listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    /// Always true.
    pub success: bool,
    /// Top-level posts with nested replies.
    pub posts: Vec<PostInfo>,
    /// Requested page.
    pub current_page: u32,
    /// Number of pages of top-level posts.
    pub total_pages: i64,
    /// Live top-level posts across all pages.
    pub total_posts: i64,
}

impl PostListResponse {
    /// Wrap a page of posts.
    pub fn new(page: Page<PostInfo>) -> Self {
        Self {
            success: true,
            current_page: page.page,
            total_pages: page.total_pages(),
            total_posts: page.total,
            posts: page.items,
        }
    }
}

/// Single post, with a message.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    /// Always true.
    pub success: bool,
    /// Message.
    pub message: String,
    /// The post.
    pub post: PostInfo,
    /// Whether the content filter flagged it; only on creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flagged: Option<bool>,
}

/// Like toggle response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    /// Always true.
    pub success: bool,
    /// Message.
    pub message: String,
    /// Whether the caller now likes the post.
    pub liked: bool,
    /// Like count after the toggle.
    pub like_count: i64,
}

/// Moderation queue listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedListResponse {
    /// Always true.
    pub success: bool,
    /// Reported posts on this page.
    pub posts: Vec<ReportedPostInfo>,
    /// Requested page.
    pub current_page: u32,
    /// Number of pages.
    pub total_pages: i64,
    /// Reported posts across all pages.
    pub total_reports: i64,
}

impl ReportedListResponse {
    /// Wrap a page of reported posts.
    pub fn new(page: Page<ReportedPostInfo>) -> Self {
        Self {
            success: true,
            current_page: page.page,
            total_pages: page.total_pages(),
            total_reports: page.total,
            posts: page.items,
        }
    }
}
