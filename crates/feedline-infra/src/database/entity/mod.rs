//! SeaORM entities for the social schema.

pub mod block;
pub mod comment;
pub mod comment_like;
pub mod follow;
pub mod post;
pub mod post_like;
pub mod post_save;
pub mod post_view;
pub mod user;
