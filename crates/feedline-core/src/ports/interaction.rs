use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{InteractionKind, ToggleOutcome};
use crate::error::RepoError;

/// Membership rows with a denormalized counter on the parent entity.
///
/// Implementations must keep the counter equal to the number of membership
/// rows for every target, including under concurrent toggles on one pair.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Insert or delete the membership and adjust the parent counter by one,
    /// atomically. Returns `RepoError::NotFound` if the parent is absent.
    async fn toggle(
        &self,
        kind: InteractionKind,
        user_id: Uuid,
        target_id: Uuid,
    ) -> Result<ToggleOutcome, RepoError>;

    /// The members of `target_ids` that `user_id` holds a membership for.
    async fn members_among(
        &self,
        kind: InteractionKind,
        user_id: Uuid,
        target_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError>;

    /// Number of membership rows for a target.
    async fn count_members(&self, kind: InteractionKind, target_id: Uuid)
    -> Result<u64, RepoError>;
}
