//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Query string of `GET /api/feed`. Out-of-range values are clamped server-side.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FeedQueryParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Author block embedded in a feed item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: String,
    pub is_following: bool,
}

/// A post as rendered to the viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItemResponse {
    pub id: String,
    pub author: AuthorResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub media: Vec<String>,
    pub likes_count: i64,
    pub saves_count: i64,
    pub comments_count: i64,
    pub created_at: String,
    /// `followed`, `others` or `seen`.
    pub tier: String,
    pub is_mine: bool,
    pub is_liked: bool,
    pub is_saved: bool,
    pub is_following: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPageResponse {
    pub items: Vec<FeedItemResponse>,
    pub pagination: PaginationMeta,
}

/// Result of a like/save toggle: the new membership state and counter value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub active: bool,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockResponse {
    pub is_blocked: bool,
}
