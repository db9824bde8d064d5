//! Like/save memberships with their denormalized counters.
//!
//! Each toggle is one transaction: the parent row is locked with
//! `SELECT ... FOR UPDATE`, then the membership row is read under the same
//! lock and either deleted or inserted, and the counter is moved by one.
//! Concurrent toggles on the same target queue on the parent row lock, so
//! counter and membership never diverge.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbConn, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use feedline_core::domain::{InteractionKind, ToggleOutcome};
use feedline_core::error::RepoError;
use feedline_core::ports::InteractionStore;

use super::entity::{comment, comment_like, post, post_like, post_save};
use super::map_db_err;

/// PostgreSQL implementation of [`InteractionStore`].
#[derive(Clone)]
pub struct PostgresInteractionStore {
    db: DbConn,
}

impl PostgresInteractionStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// Lock the parent row and return its current counter for `kind`.
async fn lock_parent(
    txn: &DatabaseTransaction,
    kind: InteractionKind,
    target_id: Uuid,
) -> Result<i64, RepoError> {
    match kind {
        InteractionKind::PostLike | InteractionKind::PostSave => {
            let parent = post::Entity::find_by_id(target_id)
                .lock_exclusive()
                .one(txn)
                .await
                .map_err(map_db_err)?
                .ok_or(RepoError::NotFound)?;
            Ok(match kind {
                InteractionKind::PostLike => parent.likes_count,
                _ => parent.saves_count,
            })
        }
        InteractionKind::CommentLike => {
            let parent = comment::Entity::find_by_id(target_id)
                .lock_exclusive()
                .one(txn)
                .await
                .map_err(map_db_err)?
                .ok_or(RepoError::NotFound)?;
            Ok(parent.likes_count)
        }
    }
}

/// Delete the membership if present, insert it otherwise.
/// Returns whether the membership exists afterwards.
async fn flip_membership(
    txn: &DatabaseTransaction,
    kind: InteractionKind,
    user_id: Uuid,
    target_id: Uuid,
) -> Result<bool, RepoError> {
    let now = Utc::now();

    let flipped = match kind {
        InteractionKind::PostLike => {
            let existing = post_like::Entity::find_by_id((user_id, target_id))
                .lock_exclusive()
                .one(txn)
                .await
                .map_err(map_db_err)?;
            match existing {
                Some(row) => row.delete(txn).await.map(|_| false),
                None => post_like::ActiveModel {
                    user_id: Set(user_id),
                    post_id: Set(target_id),
                    created_at: Set(now.into()),
                }
                .insert(txn)
                .await
                .map(|_| true),
            }
        }
        InteractionKind::PostSave => {
            let existing = post_save::Entity::find_by_id((user_id, target_id))
                .lock_exclusive()
                .one(txn)
                .await
                .map_err(map_db_err)?;
            match existing {
                Some(row) => row.delete(txn).await.map(|_| false),
                None => post_save::ActiveModel {
                    user_id: Set(user_id),
                    post_id: Set(target_id),
                    created_at: Set(now.into()),
                }
                .insert(txn)
                .await
                .map(|_| true),
            }
        }
        InteractionKind::CommentLike => {
            let existing = comment_like::Entity::find_by_id((user_id, target_id))
                .lock_exclusive()
                .one(txn)
                .await
                .map_err(map_db_err)?;
            match existing {
                Some(row) => row.delete(txn).await.map(|_| false),
                None => comment_like::ActiveModel {
                    user_id: Set(user_id),
                    comment_id: Set(target_id),
                    created_at: Set(now.into()),
                }
                .insert(txn)
                .await
                .map(|_| true),
            }
        }
    };

    flipped.map_err(map_db_err)
}

/// Move the parent counter by `delta` in place.
async fn apply_delta(
    txn: &DatabaseTransaction,
    kind: InteractionKind,
    target_id: Uuid,
    delta: i64,
) -> Result<(), RepoError> {
    let result = match kind {
        InteractionKind::PostLike => {
            post::Entity::update_many()
                .col_expr(
                    post::Column::LikesCount,
                    Expr::col(post::Column::LikesCount).add(delta),
                )
                .filter(post::Column::Id.eq(target_id))
                .exec(txn)
                .await
        }
        InteractionKind::PostSave => {
            post::Entity::update_many()
                .col_expr(
                    post::Column::SavesCount,
                    Expr::col(post::Column::SavesCount).add(delta),
                )
                .filter(post::Column::Id.eq(target_id))
                .exec(txn)
                .await
        }
        InteractionKind::CommentLike => {
            comment::Entity::update_many()
                .col_expr(
                    comment::Column::LikesCount,
                    Expr::col(comment::Column::LikesCount).add(delta),
                )
                .filter(comment::Column::Id.eq(target_id))
                .exec(txn)
                .await
        }
    }
    .map_err(map_db_err)?;

    if result.rows_affected == 0 {
        return Err(RepoError::NotFound);
    }
    Ok(())
}

#[async_trait]
impl InteractionStore for PostgresInteractionStore {
    async fn toggle(
        &self,
        kind: InteractionKind,
        user_id: Uuid,
        target_id: Uuid,
    ) -> Result<ToggleOutcome, RepoError> {
        // Dropping `txn` without commit rolls back, so every `?` below
        // leaves both the membership and the counter untouched.
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let current = lock_parent(&txn, kind, target_id).await?;
        let active = flip_membership(&txn, kind, user_id, target_id).await?;
        let delta = if active { 1 } else { -1 };
        apply_delta(&txn, kind, target_id, delta).await?;

        txn.commit().await.map_err(map_db_err)?;

        Ok(ToggleOutcome {
            active,
            count: current + delta,
        })
    }

    async fn members_among(
        &self,
        kind: InteractionKind,
        user_id: Uuid,
        target_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        if target_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let targets = target_ids.iter().copied();

        let ids: Vec<Uuid> = match kind {
            InteractionKind::PostLike => {
                post_like::Entity::find()
                    .select_only()
                    .column(post_like::Column::PostId)
                    .filter(post_like::Column::UserId.eq(user_id))
                    .filter(post_like::Column::PostId.is_in(targets))
                    .into_tuple()
                    .all(&self.db)
                    .await
            }
            InteractionKind::PostSave => {
                post_save::Entity::find()
                    .select_only()
                    .column(post_save::Column::PostId)
                    .filter(post_save::Column::UserId.eq(user_id))
                    .filter(post_save::Column::PostId.is_in(targets))
                    .into_tuple()
                    .all(&self.db)
                    .await
            }
            InteractionKind::CommentLike => {
                comment_like::Entity::find()
                    .select_only()
                    .column(comment_like::Column::CommentId)
                    .filter(comment_like::Column::UserId.eq(user_id))
                    .filter(comment_like::Column::CommentId.is_in(targets))
                    .into_tuple()
                    .all(&self.db)
                    .await
            }
        }
        .map_err(map_db_err)?;

        Ok(ids.into_iter().collect())
    }

    async fn count_members(
        &self,
        kind: InteractionKind,
        target_id: Uuid,
    ) -> Result<u64, RepoError> {
        let count = match kind {
            InteractionKind::PostLike => {
                post_like::Entity::find()
                    .filter(post_like::Column::PostId.eq(target_id))
                    .count(&self.db)
                    .await
            }
            InteractionKind::PostSave => {
                post_save::Entity::find()
                    .filter(post_save::Column::PostId.eq(target_id))
                    .count(&self.db)
                    .await
            }
            InteractionKind::CommentLike => {
                comment_like::Entity::find()
                    .filter(comment_like::Column::CommentId.eq(target_id))
                    .count(&self.db)
                    .await
            }
        };

        count.map_err(map_db_err)
    }
}
