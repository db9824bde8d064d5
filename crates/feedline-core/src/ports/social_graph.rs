use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::BlockState;
use crate::error::RepoError;

/// Block relation. Rows are directed, the effect is symmetric.
#[async_trait]
pub trait BlockGraph: Send + Sync {
    /// True if either user has blocked the other.
    async fn are_mutually_blocked(&self, a: Uuid, b: Uuid) -> Result<bool, RepoError>;

    /// Users `user_id` has blocked, plus users who have blocked `user_id`.
    async fn blocked_counterparts(&self, user_id: Uuid) -> Result<HashSet<Uuid>, RepoError>;

    /// Flip the (blocker, blocked) row under a row lock.
    async fn toggle(&self, blocker_id: Uuid, blocked_id: Uuid) -> Result<BlockState, RepoError>;
}

/// Directed follow relation, owned by the follow-management collaborator.
#[async_trait]
pub trait FollowGraph: Send + Sync {
    async fn following_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError>;

    /// The members of `candidates` that `user_id` follows.
    async fn following_subset(
        &self,
        user_id: Uuid,
        candidates: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError>;
}
