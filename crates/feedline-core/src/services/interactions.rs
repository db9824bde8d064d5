//! Like and save toggles with block-aware target resolution.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{InteractionKind, Post, ToggleOutcome, Viewer};
use crate::error::{DomainError, RepoError};
use crate::ports::{BlockGraph, CommentStore, InteractionStore, PostStore};

/// Entry point for like/save toggles.
pub struct InteractionService {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
    blocks: Arc<dyn BlockGraph>,
    store: Arc<dyn InteractionStore>,
}

impl InteractionService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        comments: Arc<dyn CommentStore>,
        blocks: Arc<dyn BlockGraph>,
        store: Arc<dyn InteractionStore>,
    ) -> Self {
        Self {
            posts,
            comments,
            blocks,
            store,
        }
    }

    pub async fn toggle_post_like(
        &self,
        viewer: &Viewer,
        post_id: Uuid,
    ) -> Result<ToggleOutcome, DomainError> {
        let post = self.visible_post(viewer, post_id).await?;
        self.toggle(InteractionKind::PostLike, viewer, post.id).await
    }

    pub async fn toggle_post_save(
        &self,
        viewer: &Viewer,
        post_id: Uuid,
    ) -> Result<ToggleOutcome, DomainError> {
        let post = self.visible_post(viewer, post_id).await?;
        self.toggle(InteractionKind::PostSave, viewer, post.id).await
    }

    /// Toggle a comment like. The comment is hidden if either the comment's
    /// author or the post's author is in a block relation with the viewer.
    pub async fn toggle_comment_like(
        &self,
        viewer: &Viewer,
        comment_id: Uuid,
    ) -> Result<ToggleOutcome, DomainError> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", comment_id))?;

        if self.is_hidden_from(viewer, comment.author_id).await? {
            return Err(DomainError::not_found("Comment", comment_id));
        }
        self.visible_post(viewer, comment.post_id)
            .await
            .map_err(|err| match err {
                DomainError::NotFound { .. } => DomainError::not_found("Comment", comment_id),
                other => other,
            })?;

        self.toggle(InteractionKind::CommentLike, viewer, comment.id)
            .await
    }

    async fn visible_post(&self, viewer: &Viewer, post_id: Uuid) -> Result<Post, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        if self.is_hidden_from(viewer, post.author_id).await? {
            return Err(DomainError::not_found("Post", post_id));
        }
        Ok(post)
    }

    async fn is_hidden_from(&self, viewer: &Viewer, author_id: Uuid) -> Result<bool, DomainError> {
        if author_id == viewer.id {
            return Ok(false);
        }
        Ok(self.blocks.are_mutually_blocked(viewer.id, author_id).await?)
    }

    async fn toggle(
        &self,
        kind: InteractionKind,
        viewer: &Viewer,
        target_id: Uuid,
    ) -> Result<ToggleOutcome, DomainError> {
        match self.store.toggle(kind, viewer.id, target_id).await {
            Ok(outcome) => {
                tracing::debug!(
                    kind = kind.as_str(),
                    user_id = %viewer.id,
                    %target_id,
                    active = outcome.active,
                    count = outcome.count,
                    "Interaction toggled"
                );
                Ok(outcome)
            }
            Err(RepoError::NotFound) => Err(DomainError::not_found(kind.target_type(), target_id)),
            Err(RepoError::Constraint(msg)) => {
                // The row lock should serialize toggles on a pair; reaching
                // this means it did not.
                tracing::error!(
                    kind = kind.as_str(),
                    user_id = %viewer.id,
                    %target_id,
                    error = %msg,
                    "Duplicate membership under lock"
                );
                Err(DomainError::Conflict(msg))
            }
            Err(err) => Err(err.into()),
        }
    }
}
