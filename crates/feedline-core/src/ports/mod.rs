//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod interaction;
mod media;
mod repository;
mod social_graph;
mod view_tracker;

pub use auth::{AuthError, TokenClaims, TokenService};
pub use interaction::InteractionStore;
pub use media::MediaResolver;
pub use repository::{BaseRepository, CommentStore, PostFilter, PostStore, SeenBy};
pub use social_graph::{BlockGraph, FollowGraph};
pub use view_tracker::ViewTracker;
