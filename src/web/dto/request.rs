//! Request DTOs for the REST API.
//!
//! Required text fields default to empty so that a missing field reaches the
//! domain validation and gets its specific message instead of a JSON error.

use serde::Deserialize;
use validator::Validate;

use super::validation::no_control_chars;
use crate::post::NewPost;
use crate::topic::{NewTopic, TopicUpdate};

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username.
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide all required fields"))]
    pub username: String,
    /// Email address.
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide all required fields"))]
    pub email: String,
    /// Password.
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide all required fields"))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide email and password"))]
    pub email: String,
    /// Password.
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide email and password"))]
    pub password: String,
}

/// Topic creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTopicRequest {
    /// Title.
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub title: String,
    /// Opening description.
    #[serde(default)]
    pub description: String,
    /// Category.
    #[serde(default)]
    pub category: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl From<CreateTopicRequest> for NewTopic {
    fn from(req: CreateTopicRequest) -> Self {
        NewTopic {
            title: req.title,
            description: req.description,
            category: req.category,
            tags: req.tags,
        }
    }
}

/// Topic edit request. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTopicRequest {
    /// New title.
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New category.
    #[serde(default)]
    pub category: Option<String>,
    /// Replacement tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl From<UpdateTopicRequest> for TopicUpdate {
    fn from(req: UpdateTopicRequest) -> Self {
        TopicUpdate {
            title: req.title,
            description: req.description,
            category: req.category,
            tags: req.tags,
        }
    }
}

/// Post creation request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    /// Body text.
    #[serde(default)]
    pub content: String,
    /// Topic to post in.
    #[serde(default)]
    pub topic_id: Option<i64>,
    /// Post being replied to.
    #[serde(default)]
    pub parent_post_id: Option<i64>,
}

impl From<CreatePostRequest> for NewPost {
    fn from(req: CreatePostRequest) -> Self {
        NewPost {
            content: req.content,
            topic_id: req.topic_id,
            parent_post_id: req.parent_post_id,
        }
    }
}

/// Post edit request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    /// New body text.
    #[serde(default)]
    pub content: String,
}

/// Report request.
#[derive(Debug, Deserialize, Validate)]
pub struct ReportRequest {
    /// Why the post is being reported.
    #[serde(default)]
    pub reason: String,
}

/// Moderation request.
#[derive(Debug, Deserialize, Validate)]
pub struct ModerateRequest {
    /// "approve" or "delete".
    #[serde(default)]
    pub action: String,
}

/// Pagination query parameters.
///
/// Kept as raw strings so malformed values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
}

/// Topic listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct TopicListQuery {
    /// Page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
    /// Category filter; "All" means none.
    pub category: Option<String>,
    /// Case-insensitive search over title and description.
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_request_camel_case() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"content":"hi","topicId":3,"parentPostId":9}"#).unwrap();
        let post = NewPost::from(req);
        assert_eq!(post.topic_id, Some(3));
        assert_eq!(post.parent_post_id, Some(9));
    }

    #[test]
    fn test_missing_fields_default() {
        let req: CreateTopicRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_empty());
        assert!(req.category.is_none());

        let req: RegisterRequest = serde_json::from_str(r#"{"username":"a"}"#).unwrap();
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("email"));
    }

    #[test]
    fn test_title_control_chars_rejected() {
        let req: CreateTopicRequest =
            serde_json::from_str(r#"{"title":"bad\u0007title","description":"d"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
