//! Feed and toggle behavior exercised end-to-end over the in-memory store.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use feedline_core::domain::{Comment, FeedTier, InteractionKind, PageRequest, Post, Viewer};
use feedline_core::error::{DomainError, RepoError};
use feedline_core::ports::{
    BaseRepository, BlockGraph, InteractionStore, PostFilter, PostStore, ViewTracker,
};
use feedline_core::services::{BlockService, FeedAssembler, InteractionService};

use super::InMemorySocialStore;

/// Post store wrapper counting tier queries.
struct CountingPostStore {
    inner: Arc<InMemorySocialStore>,
    filter_calls: AtomicUsize,
}

impl CountingPostStore {
    fn new(inner: Arc<InMemorySocialStore>) -> Self {
        Self {
            inner,
            filter_calls: AtomicUsize::new(0),
        }
    }

    fn filter_calls(&self) -> usize {
        self.filter_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for CountingPostStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        BaseRepository::<Post, Uuid>::find_by_id(self.inner.as_ref(), id).await
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        BaseRepository::<Post, Uuid>::save(self.inner.as_ref(), post).await
    }
}

#[async_trait]
impl PostStore for CountingPostStore {
    async fn find_by_filter(
        &self,
        filter: &PostFilter,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        self.filter_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_filter(filter, limit).await
    }

    async fn count_all(&self) -> Result<u64, RepoError> {
        self.inner.count_all().await
    }

    async fn count_by_filter(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        self.inner.count_by_filter(filter).await
    }

    async fn delete_with_dependents(&self, id: Uuid) -> Result<(), RepoError> {
        self.inner.delete_with_dependents(id).await
    }
}

struct Fixture {
    store: Arc<InMemorySocialStore>,
    posts: Arc<CountingPostStore>,
    feed: FeedAssembler,
    interactions: Arc<InteractionService>,
    blocks: BlockService,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemorySocialStore::with_seed(7));
    let posts = Arc::new(CountingPostStore::new(store.clone()));

    let feed = FeedAssembler::new(
        posts.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    );
    let interactions = Arc::new(InteractionService::new(
        posts.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    let blocks = BlockService::new(store.clone());

    Fixture {
        store,
        posts,
        feed,
        interactions,
        blocks,
    }
}

impl Fixture {
    async fn post_by(&self, author_id: Uuid) -> Post {
        let post = Post::new(author_id, Some("hello".to_string()), vec!["m1".to_string()]);
        BaseRepository::<Post, Uuid>::save(self.store.as_ref(), post)
            .await
            .unwrap()
    }

    async fn posts_by(&self, author_id: Uuid, n: usize) -> Vec<Post> {
        let mut posts = Vec::with_capacity(n);
        for _ in 0..n {
            posts.push(self.post_by(author_id).await);
        }
        posts
    }

    async fn comment_on(&self, post_id: Uuid, author_id: Uuid) -> Comment {
        let comment = Comment::new(post_id, author_id, "nice".to_string());
        BaseRepository::<Comment, Uuid>::save(self.store.as_ref(), comment)
            .await
            .unwrap()
    }

    async fn stored_post(&self, id: Uuid) -> Option<Post> {
        BaseRepository::<Post, Uuid>::find_by_id(self.store.as_ref(), id)
            .await
            .unwrap()
    }
}

fn page(limit: i64) -> PageRequest {
    PageRequest::new(Some(1), Some(limit))
}

fn ids(posts: &[Post]) -> HashSet<Uuid> {
    posts.iter().map(|post| post.id).collect()
}

#[tokio::test]
async fn test_followed_tier_alone_fills_page() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let followed = Uuid::new_v4();
    f.store.follow(viewer.id, followed).await;
    f.posts_by(followed, 5).await;
    f.posts_by(Uuid::new_v4(), 5).await;

    let page = f.feed.get_feed(&viewer, page(3)).await.unwrap();

    assert_eq!(page.items.len(), 3);
    assert!(page.items.iter().all(|item| item.post.author_id == followed));
    assert!(page.items.iter().all(|item| item.tier == FeedTier::Followed));
    assert_eq!(f.posts.filter_calls(), 1);
}

#[tokio::test]
async fn test_shortfall_cascades_to_other_authors() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let author_a = Uuid::new_v4();
    let author_b = Uuid::new_v4();
    f.store.follow(viewer.id, author_a).await;
    f.store.follow(viewer.id, author_b).await;
    let from_a = f.posts_by(author_a, 2).await;
    let mut others = Vec::new();
    for _ in 0..5 {
        others.push(f.post_by(Uuid::new_v4()).await);
    }

    let page = f.feed.get_feed(&viewer, page(3)).await.unwrap();

    assert_eq!(page.items.len(), 3);
    let returned: HashSet<Uuid> = page.post_ids().into_iter().collect();
    assert!(ids(&from_a).is_subset(&returned));
    let from_others: Vec<_> = page
        .items
        .iter()
        .filter(|item| item.tier == FeedTier::Others)
        .collect();
    assert_eq!(from_others.len(), 1);
    assert!(ids(&others).contains(&from_others[0].post.id));
    // Nothing was seen before, so the seen tier never runs.
    assert_eq!(f.posts.filter_calls(), 2);
}

#[tokio::test]
async fn test_all_seen_uses_seen_pool_without_blocked_authors() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let visible = Uuid::new_v4();
    let blocked = Uuid::new_v4();
    let mut all = f.posts_by(visible, 6).await;
    let hidden = f.posts_by(blocked, 2).await;
    all.extend(hidden.iter().cloned());
    let all_ids: Vec<Uuid> = all.iter().map(|post| post.id).collect();
    f.store
        .mark_seen(viewer.id, &all_ids, chrono::Utc::now())
        .await
        .unwrap();
    BlockGraph::toggle(f.store.as_ref(), blocked, viewer.id)
        .await
        .unwrap();

    let page = f.feed.get_feed(&viewer, page(5)).await.unwrap();

    assert_eq!(page.items.len(), 5);
    assert!(page.items.iter().all(|item| item.tier == FeedTier::Seen));
    assert!(page.items.iter().all(|item| item.post.author_id == visible));
    // No follows: the others tier comes back empty, then the seen tier fills.
    assert_eq!(f.posts.filter_calls(), 2);
}

#[tokio::test]
async fn test_followed_tier_fills_page_with_seen_history() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let followed = Uuid::new_v4();
    f.store.follow(viewer.id, followed).await;
    let unseen = f.posts_by(followed, 4).await;
    let seen = f.posts_by(followed, 3).await;
    let seen_ids: Vec<Uuid> = seen.iter().map(|post| post.id).collect();
    f.store
        .mark_seen(viewer.id, &seen_ids, chrono::Utc::now())
        .await
        .unwrap();

    let page = f.feed.get_feed(&viewer, page(4)).await.unwrap();

    assert_eq!(page.items.len(), 4);
    assert!(page.items.iter().all(|item| item.tier == FeedTier::Followed));
    let returned: HashSet<Uuid> = page.post_ids().into_iter().collect();
    assert_eq!(returned, ids(&unseen));
    assert_eq!(f.posts.filter_calls(), 1);
}

#[tokio::test]
async fn test_block_excludes_authors_in_both_directions() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let blocks_viewer = Uuid::new_v4();
    let blocked_by_viewer = Uuid::new_v4();
    let neutral = Uuid::new_v4();
    f.store.follow(viewer.id, blocks_viewer).await;
    f.posts_by(blocks_viewer, 3).await;
    f.posts_by(blocked_by_viewer, 3).await;
    let allowed = f.posts_by(neutral, 2).await;
    f.blocks
        .toggle(&Viewer::user(blocks_viewer), viewer.id)
        .await
        .unwrap();
    f.blocks.toggle(&viewer, blocked_by_viewer).await.unwrap();

    let page = f.feed.get_feed(&viewer, page(10)).await.unwrap();

    let returned: HashSet<Uuid> = page.post_ids().into_iter().collect();
    assert_eq!(returned, ids(&allowed));
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn test_pages_drain_unseen_before_repeating() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let author = Uuid::new_v4();
    f.posts_by(author, 7).await;

    let first = f.feed.get_feed(&viewer, page(3)).await.unwrap();
    let second = f.feed.get_feed(&viewer, page(3)).await.unwrap();
    let third = f.feed.get_feed(&viewer, page(3)).await.unwrap();

    for page in [&first, &second, &third] {
        let unique: HashSet<Uuid> = page.post_ids().into_iter().collect();
        assert_eq!(unique.len(), page.items.len());
        assert_eq!(page.items.len(), 3);
    }

    let first_ids: HashSet<Uuid> = first.post_ids().into_iter().collect();
    let second_ids: HashSet<Uuid> = second.post_ids().into_iter().collect();
    assert!(first_ids.is_disjoint(&second_ids));

    let seen = f.store.seen_ids(viewer.id, &first.post_ids()).await.unwrap();
    assert_eq!(seen, first_ids);

    let unseen_in_third = third
        .items
        .iter()
        .filter(|item| item.tier == FeedTier::Others)
        .count();
    let seen_in_third = third
        .items
        .iter()
        .filter(|item| item.tier == FeedTier::Seen)
        .count();
    assert_eq!(unseen_in_third, 1);
    assert_eq!(seen_in_third, 2);
}

#[tokio::test]
async fn test_empty_store_yields_empty_page() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());

    let page = f.feed.get_feed(&viewer, page(10)).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
    assert!(!f.store.has_seen_any(viewer.id).await.unwrap());
}

#[tokio::test]
async fn test_limit_is_clamped() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    f.posts_by(Uuid::new_v4(), 3).await;

    let page = f
        .feed
        .get_feed(&viewer, PageRequest::new(Some(-2), Some(0)))
        .await
        .unwrap();

    assert_eq!(page.limit, 1);
    assert_eq!(page.page, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total_pages(), 3);
}

#[tokio::test]
async fn test_items_carry_viewer_flags() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let followed = Uuid::new_v4();
    f.store.follow(viewer.id, followed).await;
    let theirs = f.post_by(followed).await;
    let mine = f.post_by(viewer.id).await;
    f.interactions
        .toggle_post_like(&viewer, theirs.id)
        .await
        .unwrap();
    f.interactions
        .toggle_post_save(&viewer, theirs.id)
        .await
        .unwrap();

    let page = f.feed.get_feed(&viewer, page(10)).await.unwrap();

    let their_item = page
        .items
        .iter()
        .find(|item| item.post.id == theirs.id)
        .unwrap();
    assert!(their_item.is_liked);
    assert!(their_item.is_saved);
    assert!(their_item.is_following);
    assert!(their_item.author.is_following);
    assert!(!their_item.is_mine);
    assert_eq!(their_item.post.likes_count, 1);

    let my_item = page.items.iter().find(|item| item.post.id == mine.id).unwrap();
    assert!(my_item.is_mine);
    assert!(!my_item.is_liked);
    assert!(!my_item.is_following);
}

#[tokio::test]
async fn test_get_post_hides_blocked_content_as_not_found() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let author = Uuid::new_v4();
    let post = f.post_by(author).await;

    let item = f.feed.get_post(&viewer, post.id).await.unwrap();
    assert_eq!(item.tier, FeedTier::Others);

    f.blocks.toggle(&viewer, author).await.unwrap();
    let blocked = f.feed.get_post(&viewer, post.id).await;
    let missing = f.feed.get_post(&viewer, Uuid::new_v4()).await;

    assert!(matches!(
        blocked,
        Err(DomainError::NotFound {
            entity_type: "Post",
            ..
        })
    ));
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_toggle_twice_restores_counter() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let post = f.post_by(Uuid::new_v4()).await;

    let first = f
        .interactions
        .toggle_post_like(&viewer, post.id)
        .await
        .unwrap();
    let second = f
        .interactions
        .toggle_post_like(&viewer, post.id)
        .await
        .unwrap();

    assert!(first.active);
    assert_eq!(first.count, 1);
    assert!(!second.active);
    assert_eq!(second.count, 0);
    assert_eq!(f.stored_post(post.id).await.unwrap().likes_count, 0);
}

#[tokio::test]
async fn test_resaving_stale_post_keeps_like_counter() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let post = f.post_by(Uuid::new_v4()).await;
    let mut stale = f.stored_post(post.id).await.unwrap();

    f.interactions
        .toggle_post_like(&viewer, post.id)
        .await
        .unwrap();
    stale.text = Some("edited".to_string());
    let saved = BaseRepository::<Post, Uuid>::save(f.store.as_ref(), stale)
        .await
        .unwrap();

    let stored = f.stored_post(post.id).await.unwrap();
    assert_eq!(saved, stored);
    assert_eq!(stored.text.as_deref(), Some("edited"));
    assert_eq!(stored.likes_count, 1);
    assert_eq!(
        f.store
            .count_members(InteractionKind::PostLike, post.id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_resaving_stale_comment_keeps_like_counter() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let post = f.post_by(Uuid::new_v4()).await;
    let comment = f.comment_on(post.id, Uuid::new_v4()).await;

    f.interactions
        .toggle_comment_like(&viewer, comment.id)
        .await
        .unwrap();
    let saved = BaseRepository::<Comment, Uuid>::save(
        f.store.as_ref(),
        Comment {
            text: "edited".to_string(),
            ..comment
        },
    )
    .await
    .unwrap();

    assert_eq!(saved.text, "edited");
    assert_eq!(saved.likes_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_keep_counter_consistent() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let post = f.post_by(Uuid::new_v4()).await;
    let post_id = post.id;

    for round in [31usize, 32] {
        let handles: Vec<_> = (0..round)
            .map(|_| {
                let interactions = f.interactions.clone();
                let viewer = viewer.clone();
                tokio::spawn(async move { interactions.toggle_post_like(&viewer, post_id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let likes = f.stored_post(post.id).await.unwrap().likes_count;
        let members = f
            .store
            .count_members(InteractionKind::PostLike, post.id)
            .await
            .unwrap();
        let liked = f
            .store
            .members_among(InteractionKind::PostLike, viewer.id, &[post.id])
            .await
            .unwrap()
            .contains(&post.id);

        assert!((0..=1).contains(&likes));
        assert_eq!(likes as u64, members);
        assert_eq!(liked, likes == 1);
    }

    // 31 toggles from 0 end liked, 32 more end liked again.
    assert_eq!(f.stored_post(post.id).await.unwrap().likes_count, 1);
}

#[tokio::test]
async fn test_toggle_on_missing_or_blocked_post_is_not_found() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let author = Uuid::new_v4();
    let post = f.post_by(author).await;
    BlockGraph::toggle(f.store.as_ref(), author, viewer.id)
        .await
        .unwrap();

    let missing = f
        .interactions
        .toggle_post_like(&viewer, Uuid::new_v4())
        .await;
    let blocked = f.interactions.toggle_post_save(&viewer, post.id).await;

    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    assert!(matches!(blocked, Err(DomainError::NotFound { .. })));
    assert_eq!(f.stored_post(post.id).await.unwrap().saves_count, 0);
}

#[tokio::test]
async fn test_comment_like_respects_blocks() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let commenter = Uuid::new_v4();
    let post = f.post_by(Uuid::new_v4()).await;
    let comment = f.comment_on(post.id, commenter).await;

    let liked = f
        .interactions
        .toggle_comment_like(&viewer, comment.id)
        .await
        .unwrap();
    assert!(liked.active);
    assert_eq!(liked.count, 1);

    f.blocks.toggle(&viewer, commenter).await.unwrap();
    let hidden = f.interactions.toggle_comment_like(&viewer, comment.id).await;

    assert!(matches!(
        hidden,
        Err(DomainError::NotFound {
            entity_type: "Comment",
            ..
        })
    ));
}

#[tokio::test]
async fn test_block_toggle_and_self_block() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let other = Uuid::new_v4();

    let on = f.blocks.toggle(&viewer, other).await.unwrap();
    assert!(on.is_blocked);
    assert!(f.blocks.are_mutually_blocked(other, viewer.id).await.unwrap());

    let off = f.blocks.toggle(&viewer, other).await.unwrap();
    assert!(!off.is_blocked);
    assert!(!f.blocks.are_mutually_blocked(viewer.id, other).await.unwrap());

    let own = f.blocks.toggle(&viewer, viewer.id).await;
    assert!(matches!(own, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_delete_removes_dependents() {
    let f = fixture();
    let viewer = Viewer::user(Uuid::new_v4());
    let post = f.post_by(Uuid::new_v4()).await;
    let comment = f.comment_on(post.id, Uuid::new_v4()).await;
    f.interactions
        .toggle_post_like(&viewer, post.id)
        .await
        .unwrap();
    f.interactions
        .toggle_comment_like(&viewer, comment.id)
        .await
        .unwrap();
    f.feed.get_feed(&viewer, page(5)).await.unwrap();
    assert_eq!(f.store.count_all().await.unwrap(), 1);

    f.store.delete_with_dependents(post.id).await.unwrap();

    assert!(f.stored_post(post.id).await.is_none());
    assert_eq!(f.store.count_all().await.unwrap(), 0);
    assert_eq!(
        f.store
            .count_members(InteractionKind::PostLike, post.id)
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        f.store
            .count_members(InteractionKind::CommentLike, comment.id)
            .await
            .unwrap(),
        0
    );
    assert!(!f.store.has_seen_any(viewer.id).await.unwrap());
    assert!(matches!(
        f.store.delete_with_dependents(post.id).await,
        Err(RepoError::NotFound)
    ));
}
