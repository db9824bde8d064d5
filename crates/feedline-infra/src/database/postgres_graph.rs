//! Block and follow graphs on PostgreSQL.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use feedline_core::domain::BlockState;
use feedline_core::error::RepoError;
use feedline_core::ports::{BlockGraph, FollowGraph};

use super::entity::{block, follow};
use super::map_db_err;

/// Block and follow relations backed by the `blocks` and `follows` tables.
#[derive(Clone)]
pub struct PostgresSocialGraph {
    db: DbConn,
}

impl PostgresSocialGraph {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlockGraph for PostgresSocialGraph {
    async fn are_mutually_blocked(&self, a: Uuid, b: Uuid) -> Result<bool, RepoError> {
        let rows = block::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(block::Column::BlockerId.eq(a))
                            .add(block::Column::BlockedId.eq(b)),
                    )
                    .add(
                        Condition::all()
                            .add(block::Column::BlockerId.eq(b))
                            .add(block::Column::BlockedId.eq(a)),
                    ),
            )
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows > 0)
    }

    async fn blocked_counterparts(&self, user_id: Uuid) -> Result<HashSet<Uuid>, RepoError> {
        let rows = block::Entity::find()
            .filter(
                Condition::any()
                    .add(block::Column::BlockerId.eq(user_id))
                    .add(block::Column::BlockedId.eq(user_id)),
            )
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                if row.blocker_id == user_id {
                    row.blocked_id
                } else {
                    row.blocker_id
                }
            })
            .collect())
    }

    async fn toggle(&self, blocker_id: Uuid, blocked_id: Uuid) -> Result<BlockState, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let existing = block::Entity::find_by_id((blocker_id, blocked_id))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?;

        let is_blocked = match existing {
            Some(row) => {
                row.delete(&txn).await.map_err(map_db_err)?;
                false
            }
            None => {
                // A concurrent toggle may have inserted the row after our
                // read; the pair key turns that into a no-op.
                block::Entity::insert(block::ActiveModel {
                    blocker_id: Set(blocker_id),
                    blocked_id: Set(blocked_id),
                    created_at: Set(Utc::now().into()),
                })
                .on_conflict(
                    OnConflict::columns([block::Column::BlockerId, block::Column::BlockedId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(map_db_err)?;
                true
            }
        };

        txn.commit().await.map_err(map_db_err)?;
        Ok(BlockState { is_blocked })
    }
}

#[async_trait]
impl FollowGraph for PostgresSocialGraph {
    async fn following_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        follow::Entity::find()
            .select_only()
            .column(follow::Column::FollowingId)
            .filter(follow::Column::FollowerId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn following_subset(
        &self,
        user_id: Uuid,
        candidates: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<Uuid> = follow::Entity::find()
            .select_only()
            .column(follow::Column::FollowingId)
            .filter(follow::Column::FollowerId.eq(user_id))
            .filter(follow::Column::FollowingId.is_in(candidates.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(ids.into_iter().collect())
    }
}
