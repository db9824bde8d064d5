//! Application state - shared across all handlers.

use std::sync::Arc;

use feedline_core::domain::FeedLimits;
use feedline_core::ports::{
    BlockGraph, CommentStore, FollowGraph, InteractionStore, MediaResolver, PostStore, ViewTracker,
};
use feedline_core::services::{BlockService, FeedAssembler, InteractionService};
use feedline_infra::{InMemorySocialStore, UrlPrefixMediaResolver};

#[cfg(feature = "postgres")]
use feedline_infra::{
    DatabaseConnections, PostgresCommentRepository, PostgresInteractionStore,
    PostgresPostRepository, PostgresSocialGraph, PostgresViewTracker,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedAssembler>,
    pub interactions: Arc<InteractionService>,
    pub blocks: Arc<BlockService>,
    pub media: Arc<dyn MediaResolver>,
    #[cfg(feature = "postgres")]
    pub db: Option<DatabaseConnections>,
}

/// Port implementations the services are wired from.
struct Stores {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
    blocks: Arc<dyn BlockGraph>,
    follows: Arc<dyn FollowGraph>,
    views: Arc<dyn ViewTracker>,
    interactions: Arc<dyn InteractionStore>,
}

impl Stores {
    fn in_memory(store: Arc<InMemorySocialStore>) -> Self {
        Self {
            posts: store.clone(),
            comments: store.clone(),
            blocks: store.clone(),
            follows: store.clone(),
            views: store.clone(),
            interactions: store,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: &DatabaseConnections) -> Self {
        let db = connections.main.clone();
        let graph = Arc::new(PostgresSocialGraph::new(db.clone()));

        Self {
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            blocks: graph.clone(),
            follows: graph,
            views: Arc::new(PostgresViewTracker::new(db.clone())),
            interactions: Arc::new(PostgresInteractionStore::new(db)),
        }
    }
}

impl AppState {
    /// Build the application state, falling back to the in-memory store when
    /// no database is reachable.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let (db, stores) = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let stores = Stores::postgres(&connections);
                    (Some(connections), stores)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    (None, Stores::in_memory(Arc::new(InMemorySocialStore::new())))
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (None, Stores::in_memory(Arc::new(InMemorySocialStore::new())))
            }
        };

        #[cfg(not(feature = "postgres"))]
        let stores = {
            tracing::info!("Running without postgres feature - using in-memory store");
            Stores::in_memory(Arc::new(InMemorySocialStore::new()))
        };

        let media: Arc<dyn MediaResolver> =
            Arc::new(UrlPrefixMediaResolver::new(config.media_base_url.clone()));

        tracing::info!("Application state initialized");

        Self {
            #[cfg(feature = "postgres")]
            db,
            ..Self::from_stores(stores, config.feed, media)
        }
    }

    /// State over an existing in-memory store.
    #[cfg(test)]
    pub fn in_memory(
        store: Arc<InMemorySocialStore>,
        limits: FeedLimits,
        media: Arc<dyn MediaResolver>,
    ) -> Self {
        Self::from_stores(Stores::in_memory(store), limits, media)
    }

    fn from_stores(stores: Stores, limits: FeedLimits, media: Arc<dyn MediaResolver>) -> Self {
        let feed = FeedAssembler::new(
            stores.posts.clone(),
            stores.blocks.clone(),
            stores.follows,
            stores.views,
            stores.interactions.clone(),
        )
        .with_limits(limits);

        let interactions = InteractionService::new(
            stores.posts,
            stores.comments,
            stores.blocks.clone(),
            stores.interactions,
        );

        Self {
            feed: Arc::new(feed),
            interactions: Arc::new(interactions),
            blocks: Arc::new(BlockService::new(stores.blocks)),
            media,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }
}
