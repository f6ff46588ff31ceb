//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create a draft post. When `slug` is omitted the server derives
/// one from the title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub author_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request to register an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthorRequest {
    pub username: String,
    pub email: String,
}

/// Request to create a comment on a published post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub name: String,
    pub email: String,
    pub body: String,
}

/// Request to toggle a comment's moderation flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerateCommentRequest {
    pub active: bool,
}

/// Pagination query parameters for the post list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    10
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// A post as it appears in the published list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub published_at: String,
    pub tags: Vec<String>,
}

/// A single post with its readers' view of comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub body: String,
    pub status: String,
    pub published_at: String,
    pub created_at: String,
    pub updated_at: String,
    pub tags: Vec<String>,
    pub comments: Vec<CommentResponse>,
}

/// A comment as returned to readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub name: String,
    pub body: String,
    pub created_at: String,
}
