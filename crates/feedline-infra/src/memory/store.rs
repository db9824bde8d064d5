use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::sync::RwLock;
use uuid::Uuid;

use feedline_core::domain::{BlockState, Comment, InteractionKind, Post, ToggleOutcome};
use feedline_core::error::RepoError;
use feedline_core::ports::{
    BaseRepository, BlockGraph, CommentStore, FollowGraph, InteractionStore, PostFilter,
    PostStore, ViewTracker,
};

#[derive(Default)]
struct SocialState {
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    /// (follower, following)
    follows: HashSet<(Uuid, Uuid)>,
    /// (blocker, blocked)
    blocks: HashSet<(Uuid, Uuid)>,
    /// (user, post) -> last viewed
    views: HashMap<(Uuid, Uuid), DateTime<Utc>>,
    /// kind -> (user, target)
    memberships: HashMap<InteractionKind, HashSet<(Uuid, Uuid)>>,
}

impl SocialState {
    fn counter_mut(&mut self, kind: InteractionKind, target_id: Uuid) -> Option<&mut i64> {
        match kind {
            InteractionKind::PostLike => self.posts.get_mut(&target_id).map(|p| &mut p.likes_count),
            InteractionKind::PostSave => self.posts.get_mut(&target_id).map(|p| &mut p.saves_count),
            InteractionKind::CommentLike => self
                .comments
                .get_mut(&target_id)
                .map(|c| &mut c.likes_count),
        }
    }

    fn matches(&self, filter: &PostFilter, post: &Post) -> bool {
        filter.matches(post, |user_id, post_id| {
            self.views.contains_key(&(user_id, post_id))
        })
    }
}

/// Single-process store implementing every port over one state.
///
/// Writers take the state's write lock for their whole read-decide-write,
/// which plays the role of the row lock the PostgreSQL stores take.
pub struct InMemorySocialStore {
    state: RwLock<SocialState>,
    rng: Mutex<StdRng>,
}

impl InMemorySocialStore {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic random ordering, for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            state: RwLock::new(SocialState::default()),
            rng: Mutex::new(rng),
        }
    }

    /// Record a follow edge. Follow management is owned elsewhere; this
    /// exists to seed the graph.
    pub async fn follow(&self, follower_id: Uuid, following_id: Uuid) {
        let mut state = self.state.write().await;
        state.follows.insert((follower_id, following_id));
    }

    fn shuffle(&self, posts: &mut [Post]) {
        // A poisoned lock only means another shuffle panicked; the RNG is
        // still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        posts.shuffle(&mut *rng);
    }
}

impl Default for InMemorySocialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemorySocialStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        // Counters belong to the toggles; an update only edits content.
        let saved = match state.posts.get(&post.id) {
            Some(stored) => Post {
                text: post.text,
                media: post.media,
                ..stored.clone()
            },
            None => post,
        };
        state.posts.insert(saved.id, saved.clone());
        Ok(saved)
    }
}

#[async_trait]
impl PostStore for InMemorySocialStore {
    async fn find_by_filter(
        &self,
        filter: &PostFilter,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        if limit == 0 || filter.is_unsatisfiable() {
            return Ok(Vec::new());
        }

        let mut posts: Vec<Post> = {
            let state = self.state.read().await;
            state
                .posts
                .values()
                .filter(|post| state.matches(filter, post))
                .cloned()
                .collect()
        };

        self.shuffle(&mut posts);
        posts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(posts)
    }

    async fn count_all(&self) -> Result<u64, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.len() as u64)
    }

    async fn count_by_filter(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        if filter.is_unsatisfiable() {
            return Ok(0);
        }
        let state = self.state.read().await;
        Ok(state.posts.values().filter(|post| state.matches(filter, post)).count() as u64)
    }

    async fn delete_with_dependents(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;

        if state.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        let comment_ids: HashSet<Uuid> = state
            .comments
            .values()
            .filter(|comment| comment.post_id == id)
            .map(|comment| comment.id)
            .collect();
        state.comments.retain(|comment_id, _| !comment_ids.contains(comment_id));
        state.views.retain(|(_, post_id), _| *post_id != id);

        for (kind, members) in state.memberships.iter_mut() {
            match kind {
                InteractionKind::PostLike | InteractionKind::PostSave => {
                    members.retain(|(_, target)| *target != id)
                }
                InteractionKind::CommentLike => {
                    members.retain(|(_, target)| !comment_ids.contains(target))
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemorySocialStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let state = self.state.read().await;
        Ok(state.comments.get(&id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&comment.post_id) {
            return Err(RepoError::NotFound);
        }
        let saved = match state.comments.get(&comment.id) {
            Some(stored) => Comment {
                text: comment.text,
                ..stored.clone()
            },
            None => comment,
        };
        state.comments.insert(saved.id, saved.clone());
        Ok(saved)
    }
}

impl CommentStore for InMemorySocialStore {}

#[async_trait]
impl BlockGraph for InMemorySocialStore {
    async fn are_mutually_blocked(&self, a: Uuid, b: Uuid) -> Result<bool, RepoError> {
        let state = self.state.read().await;
        Ok(state.blocks.contains(&(a, b)) || state.blocks.contains(&(b, a)))
    }

    async fn blocked_counterparts(&self, user_id: Uuid) -> Result<HashSet<Uuid>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .blocks
            .iter()
            .filter_map(|&(blocker, blocked)| {
                if blocker == user_id {
                    Some(blocked)
                } else if blocked == user_id {
                    Some(blocker)
                } else {
                    None
                }
            })
            .collect())
    }

    async fn toggle(&self, blocker_id: Uuid, blocked_id: Uuid) -> Result<BlockState, RepoError> {
        let mut state = self.state.write().await;
        let key = (blocker_id, blocked_id);

        let is_blocked = if state.blocks.remove(&key) {
            false
        } else {
            state.blocks.insert(key);
            true
        };

        Ok(BlockState { is_blocked })
    }
}

#[async_trait]
impl FollowGraph for InMemorySocialStore {
    async fn following_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, following)| *following)
            .collect())
    }

    async fn following_subset(
        &self,
        user_id: Uuid,
        candidates: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        let state = self.state.read().await;
        Ok(candidates
            .iter()
            .copied()
            .filter(|candidate| state.follows.contains(&(user_id, *candidate)))
            .collect())
    }
}

#[async_trait]
impl ViewTracker for InMemorySocialStore {
    async fn seen_ids(
        &self,
        user_id: Uuid,
        candidates: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        let state = self.state.read().await;
        Ok(candidates
            .iter()
            .copied()
            .filter(|post_id| state.views.contains_key(&(user_id, *post_id)))
            .collect())
    }

    async fn has_seen_any(&self, user_id: Uuid) -> Result<bool, RepoError> {
        let state = self.state.read().await;
        Ok(state.views.keys().any(|(viewer, _)| *viewer == user_id))
    }

    async fn mark_seen(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        if post_ids.is_empty() {
            return Ok(());
        }
        let mut state = self.state.write().await;
        for post_id in post_ids {
            state.views.insert((user_id, *post_id), at);
        }
        Ok(())
    }
}

#[async_trait]
impl InteractionStore for InMemorySocialStore {
    async fn toggle(
        &self,
        kind: InteractionKind,
        user_id: Uuid,
        target_id: Uuid,
    ) -> Result<ToggleOutcome, RepoError> {
        let mut state = self.state.write().await;

        if state.counter_mut(kind, target_id).is_none() {
            return Err(RepoError::NotFound);
        }

        let members = state.memberships.entry(kind).or_default();
        let key = (user_id, target_id);
        let active = if members.remove(&key) {
            false
        } else {
            members.insert(key);
            true
        };

        let delta = if active { 1 } else { -1 };
        let counter = state
            .counter_mut(kind, target_id)
            .ok_or(RepoError::NotFound)?;
        *counter += delta;

        Ok(ToggleOutcome {
            active,
            count: *counter,
        })
    }

    async fn members_among(
        &self,
        kind: InteractionKind,
        user_id: Uuid,
        target_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        let state = self.state.read().await;
        let Some(members) = state.memberships.get(&kind) else {
            return Ok(HashSet::new());
        };
        Ok(target_ids
            .iter()
            .copied()
            .filter(|target| members.contains(&(user_id, *target)))
            .collect())
    }

    async fn count_members(
        &self,
        kind: InteractionKind,
        target_id: Uuid,
    ) -> Result<u64, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .get(&kind)
            .map(|members| members.iter().filter(|(_, t)| *t == target_id).count() as u64)
            .unwrap_or(0))
    }
}
