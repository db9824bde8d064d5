//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use feedline_core::error::RepoError;

use crate::database::EditableModel;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub author_id: Uuid,
    #[sea_orm(column_type = "Text", nullable)]
    pub text: Option<String>,
    /// Ordered array of opaque media ids.
    #[sea_orm(column_type = "JsonBinary")]
    pub media: Json,
    pub likes_count: i64,
    pub saves_count: i64,
    pub comments_count: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for feedline_core::domain::Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let media = serde_json::from_value(model.media).map_err(|e| {
            tracing::warn!(post_id = %model.id, error = %e, "Malformed media column");
            RepoError::Query(format!("post {} has malformed media: {e}", model.id))
        })?;

        Ok(Self {
            id: model.id,
            author_id: model.author_id,
            text: model.text,
            media,
            likes_count: model.likes_count,
            saves_count: model.saves_count,
            comments_count: model.comments_count,
            created_at: model.created_at.into(),
        })
    }
}

impl From<feedline_core::domain::Post> for ActiveModel {
    fn from(post: feedline_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            text: Set(post.text),
            media: Set(Json::from(post.media)),
            likes_count: Set(post.likes_count),
            saves_count: Set(post.saves_count),
            comments_count: Set(post.comments_count),
            created_at: Set(post.created_at.into()),
        }
    }
}

impl EditableModel for ActiveModel {
    fn editable_only(self) -> Self {
        Self {
            author_id: NotSet,
            likes_count: NotSet,
            saves_count: NotSet,
            comments_count: NotSet,
            created_at: NotSet,
            ..self
        }
    }
}
