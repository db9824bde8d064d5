//! Domain entities - the core business objects.

mod comment;
mod feed;
mod interaction;
mod post;
mod viewer;

pub use comment::Comment;
pub use feed::{AuthorSummary, FeedItem, FeedLimits, FeedPage, FeedQuery, FeedTier, PageRequest};
pub use interaction::{BlockState, InteractionKind, ToggleOutcome};
pub use post::Post;
pub use viewer::Viewer;
