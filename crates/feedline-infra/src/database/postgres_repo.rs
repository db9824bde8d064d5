//! PostgreSQL post and comment repositories.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Query, SelectStatement};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use feedline_core::domain::Post;
use feedline_core::error::RepoError;
use feedline_core::ports::{CommentStore, PostFilter, PostStore, SeenBy};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::{comment_like, post_like, post_save, post_view};
use super::map_db_err;
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// `SELECT post_id FROM post_views WHERE user_id = $1`
fn viewed_by(user_id: Uuid) -> SelectStatement {
    Query::select()
        .column(post_view::Column::PostId)
        .from(post_view::Entity)
        .and_where(post_view::Column::UserId.eq(user_id))
        .to_owned()
}

/// Translate a set predicate into a WHERE clause. Empty exclusion sets add
/// nothing; callers short-circuit empty inclusion sets before querying. The
/// view restriction is a subquery, so its cost in bind parameters is one.
pub(crate) fn filter_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(authors) = &filter.author_in {
        condition = condition.add(post::Column::AuthorId.is_in(authors.iter().copied()));
    }
    if !filter.author_not_in.is_empty() {
        condition =
            condition.add(post::Column::AuthorId.is_not_in(filter.author_not_in.iter().copied()));
    }
    if let Some(ids) = &filter.id_in {
        condition = condition.add(post::Column::Id.is_in(ids.iter().copied()));
    }
    if !filter.id_not_in.is_empty() {
        condition = condition.add(post::Column::Id.is_not_in(filter.id_not_in.iter().copied()));
    }
    match filter.seen {
        Some(SeenBy::Seen(user_id)) => {
            condition = condition.add(post::Column::Id.in_subquery(viewed_by(user_id)));
        }
        Some(SeenBy::Unseen(user_id)) => {
            condition = condition.add(post::Column::Id.not_in_subquery(viewed_by(user_id)));
        }
        None => {}
    }

    condition
}

#[async_trait]
impl PostStore for PostgresPostRepository {
    async fn find_by_filter(
        &self,
        filter: &PostFilter,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        if limit == 0 || filter.is_unsatisfiable() {
            return Ok(Vec::new());
        }

        let result = PostEntity::find()
            .filter(filter_condition(filter))
            .order_by(Expr::cust("RANDOM()"), Order::Asc)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        result.into_iter().map(Post::try_from).collect()
    }

    async fn count_all(&self) -> Result<u64, RepoError> {
        PostEntity::find().count(&self.db).await.map_err(map_db_err)
    }

    async fn count_by_filter(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        if filter.is_unsatisfiable() {
            return Ok(0);
        }
        PostEntity::find()
            .filter(filter_condition(filter))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn delete_with_dependents(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        PostEntity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let comment_ids: Vec<Uuid> = CommentEntity::find()
            .select_only()
            .column(comment::Column::Id)
            .filter(comment::Column::PostId.eq(id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(map_db_err)?;

        if !comment_ids.is_empty() {
            comment_like::Entity::delete_many()
                .filter(comment_like::Column::CommentId.is_in(comment_ids))
                .exec(&txn)
                .await
                .map_err(map_db_err)?;
        }
        CommentEntity::delete_many()
            .filter(comment::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        post_like::Entity::delete_many()
            .filter(post_like::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        post_save::Entity::delete_many()
            .filter(post_save::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        post_view::Entity::delete_many()
            .filter(post_view::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        PostEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        tracing::info!(post_id = %id, "Post deleted with dependents");
        Ok(())
    }
}

impl CommentStore for PostgresCommentRepository {}
