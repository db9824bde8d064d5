use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{BlockState, Viewer};
use crate::error::{DomainError, RepoError};
use crate::ports::BlockGraph;

/// Block toggling and block checks.
pub struct BlockService {
    blocks: Arc<dyn BlockGraph>,
}

impl BlockService {
    pub fn new(blocks: Arc<dyn BlockGraph>) -> Self {
        Self { blocks }
    }

    /// Block `target_id` if not blocked, otherwise unblock.
    pub async fn toggle(&self, viewer: &Viewer, target_id: Uuid) -> Result<BlockState, DomainError> {
        if viewer.id == target_id {
            return Err(DomainError::Validation(
                "Users cannot block themselves".to_string(),
            ));
        }

        match self.blocks.toggle(viewer.id, target_id).await {
            Ok(state) => {
                tracing::info!(
                    blocker_id = %viewer.id,
                    blocked_id = %target_id,
                    is_blocked = state.is_blocked,
                    "Block toggled"
                );
                Ok(state)
            }
            Err(RepoError::NotFound) => Err(DomainError::not_found("User", target_id)),
            Err(RepoError::Constraint(msg)) => Err(DomainError::Conflict(msg)),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn are_mutually_blocked(&self, a: Uuid, b: Uuid) -> Result<bool, DomainError> {
        Ok(self.blocks.are_mutually_blocked(a, b).await?)
    }
}
