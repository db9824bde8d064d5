use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post};
use crate::error::RepoError;

/// Generic repository trait for the entities the engine reads by id.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;
}

/// Restriction on the viewer's own view history.
///
/// Stores resolve this against their view rows at query time, so the history
/// never has to be loaded or sent with the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeenBy {
    /// Only posts `user` has viewed.
    Seen(Uuid),
    /// Only posts `user` has not viewed.
    Unseen(Uuid),
}

/// Set-based predicate over posts.
///
/// `None` inclusion sets mean "no restriction"; empty exclusion sets are skipped
/// entirely by implementations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub author_in: Option<HashSet<Uuid>>,
    pub author_not_in: HashSet<Uuid>,
    pub id_in: Option<HashSet<Uuid>>,
    pub id_not_in: HashSet<Uuid>,
    pub seen: Option<SeenBy>,
}

impl PostFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authored_by(mut self, authors: impl IntoIterator<Item = Uuid>) -> Self {
        self.author_in = Some(authors.into_iter().collect());
        self
    }

    pub fn excluding_authors<'a>(mut self, authors: impl IntoIterator<Item = &'a Uuid>) -> Self {
        self.author_not_in.extend(authors);
        self
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.id_in = Some(ids.into_iter().collect());
        self
    }

    pub fn excluding_ids<'a>(mut self, ids: impl IntoIterator<Item = &'a Uuid>) -> Self {
        self.id_not_in.extend(ids);
        self
    }

    pub fn seen_by(mut self, user_id: Uuid) -> Self {
        self.seen = Some(SeenBy::Seen(user_id));
        self
    }

    pub fn unseen_by(mut self, user_id: Uuid) -> Self {
        self.seen = Some(SeenBy::Unseen(user_id));
        self
    }

    /// True when no post can match (an empty inclusion set).
    pub fn is_unsatisfiable(&self) -> bool {
        self.author_in.as_ref().is_some_and(HashSet::is_empty)
            || self.id_in.as_ref().is_some_and(HashSet::is_empty)
    }

    /// Evaluate the predicate against a single post. `has_seen(user, post)`
    /// answers the view-history restriction.
    pub fn matches(&self, post: &Post, has_seen: impl Fn(Uuid, Uuid) -> bool) -> bool {
        if let Some(authors) = &self.author_in {
            if !authors.contains(&post.author_id) {
                return false;
            }
        }
        if let Some(ids) = &self.id_in {
            if !ids.contains(&post.id) {
                return false;
            }
        }
        if self.author_not_in.contains(&post.author_id) || self.id_not_in.contains(&post.id) {
            return false;
        }
        match self.seen {
            Some(SeenBy::Seen(user_id)) => has_seen(user_id, post.id),
            Some(SeenBy::Unseen(user_id)) => !has_seen(user_id, post.id),
            None => true,
        }
    }
}

/// Post query surface consumed by the feed.
#[async_trait]
pub trait PostStore: BaseRepository<Post, Uuid> {
    /// Posts matching `filter` in uniform-random order, at most `limit` rows.
    async fn find_by_filter(&self, filter: &PostFilter, limit: u64)
    -> Result<Vec<Post>, RepoError>;

    async fn count_all(&self) -> Result<u64, RepoError>;

    async fn count_by_filter(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    /// Delete a post together with its comments, likes, saves and views,
    /// in one transaction.
    async fn delete_with_dependents(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Comment reads needed by comment likes.
pub trait CommentStore: BaseRepository<Comment, Uuid> {}
