use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a piece of content shown in the feed.
///
/// The counters are denormalized: `likes_count` and `saves_count` always
/// equal the number of like/save membership rows for this post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: Option<String>,
    /// Opaque media references, in display order.
    pub media: Vec<String>,
    pub likes_count: i64,
    pub saves_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with zeroed counters.
    pub fn new(author_id: Uuid, text: Option<String>, media: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            text,
            media,
            likes_count: 0,
            saves_count: 0,
            comments_count: 0,
            created_at: Utc::now(),
        }
    }
}
