use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, EntityTrait, IntoActiveModel, PrimaryKeyTrait,
    SqlErr,
};

use feedline_core::error::RepoError;
use feedline_core::ports::BaseRepository;

use super::map_db_err;

/// Active models whose update path must leave some columns alone.
pub trait EditableModel {
    /// Unset every column the update path may not write: denormalized
    /// counters owned by the toggle transactions and immutable keys.
    fn editable_only(self) -> Self;
}

/// Generic PostgreSQL repository implementation.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel:
        ActiveModelTrait<Entity = E> + ActiveModelBehavior + EditableModel + Clone + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
    T: TryFrom<E::Model, Error = RepoError> + Into<E::ActiveModel> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(&self.db).await.map_err(map_db_err)?;

        result.map(T::try_from).transpose()
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        // Every field is `Set`, so `ActiveModel::save` would always pick UPDATE.
        // Insert first and fall back to an update of the editable columns.
        let active_model: E::ActiveModel = entity.into();
        let model = match active_model.clone().insert(&self.db).await {
            Ok(model) => model,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                active_model
                    .editable_only()
                    .update(&self.db)
                    .await
                    .map_err(map_db_err)?
            }
            Err(e) => return Err(map_db_err(e)),
        };

        T::try_from(model)
    }
}
