//! Feed assembly: a three-tier waterfall over the post store.
//!
//! Tiers are consulted in strict priority order and each tier only sees the
//! shortfall left by the previous ones:
//!
//! 1. unseen posts from followed authors
//! 2. unseen posts from everyone else
//! 3. previously seen posts
//!
//! View history is unbounded, so the seen restriction travels as a predicate
//! the store evaluates, never as an id list. Within a tier the store returns
//! rows in random order. Authors in a block
//! relation with the viewer (either direction) are excluded from every tier.
//! Returned posts are marked seen, so repeated calls drain the unseen pools
//! before anything is shown twice.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    AuthorSummary, FeedItem, FeedLimits, FeedPage, FeedTier, InteractionKind, PageRequest, Post,
    Viewer,
};
use crate::error::DomainError;
use crate::ports::{
    BlockGraph, FollowGraph, InteractionStore, PostFilter, PostStore, ViewTracker,
};

/// Inclusion and exclusion sets resolved once per request. The view history
/// itself stays in the store; only whether it is empty is known here.
struct FeedContext {
    blocked: HashSet<Uuid>,
    following: HashSet<Uuid>,
    has_seen: bool,
}

/// Ordered, de-duplicated accumulator for one page.
struct Collector {
    items: Vec<(Post, FeedTier)>,
    ids: HashSet<Uuid>,
    limit: usize,
}

impl Collector {
    fn new(limit: usize) -> Self {
        Self {
            items: Vec::with_capacity(limit),
            ids: HashSet::with_capacity(limit),
            limit,
        }
    }

    fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.items.len())
    }

    fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    fn ids(&self) -> &HashSet<Uuid> {
        &self.ids
    }

    /// Append posts until the page is full. Returns how many were taken.
    fn extend(&mut self, tier: FeedTier, posts: Vec<Post>) -> usize {
        let mut taken = 0;
        for post in posts {
            if self.is_full() {
                break;
            }
            if self.ids.insert(post.id) {
                self.items.push((post, tier));
                taken += 1;
            }
        }
        taken
    }

    fn into_items(self) -> Vec<(Post, FeedTier)> {
        self.items
    }
}

/// Builds feed pages for a viewer.
pub struct FeedAssembler {
    posts: Arc<dyn PostStore>,
    blocks: Arc<dyn BlockGraph>,
    follows: Arc<dyn FollowGraph>,
    views: Arc<dyn ViewTracker>,
    interactions: Arc<dyn InteractionStore>,
    limits: FeedLimits,
}

impl FeedAssembler {
    pub fn new(
        posts: Arc<dyn PostStore>,
        blocks: Arc<dyn BlockGraph>,
        follows: Arc<dyn FollowGraph>,
        views: Arc<dyn ViewTracker>,
        interactions: Arc<dyn InteractionStore>,
    ) -> Self {
        Self {
            posts,
            blocks,
            follows,
            views,
            interactions,
            limits: FeedLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: FeedLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &FeedLimits {
        &self.limits
    }

    /// Assemble one page of the feed and mark its posts as seen.
    pub async fn get_feed(
        &self,
        viewer: &Viewer,
        request: PageRequest,
    ) -> Result<FeedPage, DomainError> {
        let query = request.resolve(&self.limits);
        let context = self.build_context(viewer.id).await?;
        let mut collected = Collector::new(query.limit as usize);

        if !context.following.is_empty() {
            let filter = PostFilter::new()
                .authored_by(context.following.iter().copied())
                .excluding_authors(&context.blocked)
                .unseen_by(viewer.id);
            self.fill_tier(&mut collected, FeedTier::Followed, &filter)
                .await?;
        }

        if !collected.is_full() {
            let filter = PostFilter::new()
                .excluding_authors(&context.following)
                .excluding_authors(&context.blocked)
                .excluding_ids(collected.ids())
                .unseen_by(viewer.id);
            self.fill_tier(&mut collected, FeedTier::Others, &filter)
                .await?;
        }

        if !collected.is_full() && context.has_seen {
            let filter = PostFilter::new()
                .excluding_authors(&context.blocked)
                .excluding_ids(collected.ids())
                .seen_by(viewer.id);
            self.fill_tier(&mut collected, FeedTier::Seen, &filter)
                .await?;
        }

        let items = self.decorate(viewer, collected.into_items()).await?;
        let post_ids: Vec<Uuid> = items.iter().map(|item| item.post.id).collect();

        if !post_ids.is_empty() {
            self.views
                .mark_seen(viewer.id, &post_ids, Utc::now())
                .await?;
        }

        let total = self
            .posts
            .count_by_filter(&PostFilter::new().excluding_authors(&context.blocked))
            .await?;

        tracing::debug!(
            viewer_id = %viewer.id,
            returned = items.len(),
            limit = query.limit,
            total,
            "Feed page assembled"
        );

        Ok(FeedPage {
            items,
            page: query.page,
            limit: query.limit,
            total,
        })
    }

    /// Read a single post with viewer flags.
    ///
    /// A post whose author is in a block relation with the viewer is
    /// reported exactly like a missing one.
    pub async fn get_post(&self, viewer: &Viewer, post_id: Uuid) -> Result<FeedItem, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        if post.author_id != viewer.id
            && self
                .blocks
                .are_mutually_blocked(viewer.id, post.author_id)
                .await?
        {
            tracing::debug!(viewer_id = %viewer.id, %post_id, "Post hidden by block");
            return Err(DomainError::not_found("Post", post_id));
        }

        let seen = self.views.seen_ids(viewer.id, &[post_id]).await?;
        let tier = if seen.contains(&post_id) {
            FeedTier::Seen
        } else if self
            .follows
            .following_subset(viewer.id, &[post.author_id])
            .await?
            .contains(&post.author_id)
        {
            FeedTier::Followed
        } else {
            FeedTier::Others
        };

        let mut items = self.decorate(viewer, vec![(post, tier)]).await?;
        items
            .pop()
            .ok_or_else(|| DomainError::Internal("decorated post went missing".to_string()))
    }

    async fn build_context(&self, viewer_id: Uuid) -> Result<FeedContext, DomainError> {
        let blocked = self.blocks.blocked_counterparts(viewer_id).await?;
        let has_seen = self.views.has_seen_any(viewer_id).await?;
        let following = self
            .follows
            .following_ids(viewer_id)
            .await?
            .into_iter()
            .filter(|id| !blocked.contains(id))
            .collect();

        Ok(FeedContext {
            blocked,
            following,
            has_seen,
        })
    }

    async fn fill_tier(
        &self,
        collected: &mut Collector,
        tier: FeedTier,
        filter: &PostFilter,
    ) -> Result<(), DomainError> {
        if filter.is_unsatisfiable() {
            return Ok(());
        }

        let wanted = collected.remaining();
        let posts = self
            .posts
            .find_by_filter(filter, wanted as u64)
            .await?;
        let fetched = posts.len();
        let taken = collected.extend(tier, posts);

        tracing::trace!(?tier, wanted, fetched, taken, "Feed tier queried");
        Ok(())
    }

    /// Attach viewer-relative flags. The three lookups are independent and
    /// run concurrently, one batch query each.
    async fn decorate(
        &self,
        viewer: &Viewer,
        posts: Vec<(Post, FeedTier)>,
    ) -> Result<Vec<FeedItem>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|(post, _)| post.id).collect();
        let mut author_ids: Vec<Uuid> = posts.iter().map(|(post, _)| post.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let (liked, saved, following) = futures::try_join!(
            self.interactions
                .members_among(InteractionKind::PostLike, viewer.id, &post_ids),
            self.interactions
                .members_among(InteractionKind::PostSave, viewer.id, &post_ids),
            self.follows.following_subset(viewer.id, &author_ids),
        )?;

        Ok(posts
            .into_iter()
            .map(|(post, tier)| {
                let is_following = following.contains(&post.author_id);
                FeedItem {
                    is_mine: post.author_id == viewer.id,
                    is_liked: liked.contains(&post.id),
                    is_saved: saved.contains(&post.id),
                    is_following,
                    author: AuthorSummary {
                        id: post.author_id,
                        is_following,
                    },
                    tier,
                    post,
                }
            })
            .collect())
    }
}
