use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::RepoError;

/// Per-(user, post) view history.
#[async_trait]
pub trait ViewTracker: Send + Sync {
    /// The members of `candidates` already viewed by `user_id`.
    async fn seen_ids(&self, user_id: Uuid, candidates: &[Uuid])
    -> Result<HashSet<Uuid>, RepoError>;

    /// Whether `user_id` has viewed anything at all.
    async fn has_seen_any(&self, user_id: Uuid) -> Result<bool, RepoError>;

    /// Upsert view rows, refreshing `last_viewed_at` on existing ones.
    async fn mark_seen(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
        at: DateTime<Utc>,
    ) -> Result<(), RepoError>;
}
