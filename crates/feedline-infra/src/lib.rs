//! # Feedline Infrastructure
//!
//! Concrete implementations of the ports defined in `feedline-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL stores via SeaORM
//! - `auth` - JWT identity validation

#[cfg(feature = "postgres")]
pub mod database;
pub mod media;
pub mod memory;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use media::UrlPrefixMediaResolver;
pub use memory::InMemorySocialStore;

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, DatabaseConnections, PostgresCommentRepository, PostgresInteractionStore,
    PostgresPostRepository, PostgresSocialGraph, PostgresViewTracker,
};
