//! PostgreSQL stores via SeaORM.

mod connections;
mod postgres_base;
mod postgres_graph;
mod postgres_interactions;
pub mod postgres_repo;
mod postgres_views;

pub mod entity;

use sea_orm::{DbErr, SqlErr};

use feedline_core::error::RepoError;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use postgres_base::{EditableModel, PostgresBaseRepository};
pub use postgres_graph::PostgresSocialGraph;
pub use postgres_interactions::PostgresInteractionStore;
pub use postgres_repo::{PostgresCommentRepository, PostgresPostRepository};
pub use postgres_views::PostgresViewTracker;

/// Map a SeaORM error onto the repository taxonomy.
///
/// Unique violations surface as `Constraint`; foreign key violations mean a
/// referenced row is missing and surface as `NotFound`.
pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => RepoError::Constraint(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => RepoError::NotFound,
        _ => match err {
            DbErr::Conn(e) => RepoError::Connection(e.to_string()),
            DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
            other => RepoError::Query(other.to_string()),
        },
    }
}
