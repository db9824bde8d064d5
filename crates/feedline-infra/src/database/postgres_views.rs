//! View history on PostgreSQL.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter, QuerySelect, Set};
use uuid::Uuid;

use feedline_core::error::RepoError;
use feedline_core::ports::ViewTracker;

use super::entity::post_view;
use super::map_db_err;

/// `post_views` upsert store.
#[derive(Clone)]
pub struct PostgresViewTracker {
    db: DbConn,
}

impl PostgresViewTracker {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ViewTracker for PostgresViewTracker {
    async fn seen_ids(
        &self,
        user_id: Uuid,
        candidates: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<Uuid> = post_view::Entity::find()
            .select_only()
            .column(post_view::Column::PostId)
            .filter(post_view::Column::UserId.eq(user_id))
            .filter(post_view::Column::PostId.is_in(candidates.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(ids.into_iter().collect())
    }

    async fn has_seen_any(&self, user_id: Uuid) -> Result<bool, RepoError> {
        let first: Option<Uuid> = post_view::Entity::find()
            .select_only()
            .column(post_view::Column::PostId)
            .filter(post_view::Column::UserId.eq(user_id))
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(first.is_some())
    }

    async fn mark_seen(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        if post_ids.is_empty() {
            return Ok(());
        }

        // One statement may not upsert the same key twice.
        let unique: HashSet<Uuid> = post_ids.iter().copied().collect();
        let rows = unique.into_iter().map(|post_id| post_view::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(post_id),
            last_viewed_at: Set(at.into()),
        });

        post_view::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([post_view::Column::UserId, post_view::Column::PostId])
                    .update_column(post_view::Column::LastViewedAt)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::trace!(%user_id, marked = post_ids.len(), "Posts marked seen");
        Ok(())
    }
}
