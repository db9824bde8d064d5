//! HTTP handlers and route configuration.

mod blocks;
mod feed;
mod health;
mod interactions;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Authenticated routes
            .route("/feed", web::get().to(feed::get_feed))
            .service(
                web::scope("/posts")
                    .route("/{id}", web::get().to(feed::get_post))
                    .route("/{id}/like", web::post().to(interactions::like_post))
                    .route("/{id}/save", web::post().to(interactions::save_post)),
            )
            .route(
                "/comments/{id}/like",
                web::post().to(interactions::like_comment),
            )
            .route("/users/{id}/block", web::post().to(blocks::toggle_block)),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test};
    use serde_json::Value;
    use uuid::Uuid;

    use feedline_core::domain::{FeedLimits, Post};
    use feedline_core::ports::{BaseRepository, BlockGraph, TokenService};
    use feedline_infra::{InMemorySocialStore, JwtConfig, JwtTokenService, UrlPrefixMediaResolver};

    use super::*;
    use crate::state::AppState;

    struct Harness {
        store: Arc<InMemorySocialStore>,
        state: AppState,
        tokens: Arc<dyn TokenService>,
    }

    impl Harness {
        fn new() -> Self {
            let store = Arc::new(InMemorySocialStore::with_seed(11));
            let state = AppState::in_memory(
                store.clone(),
                FeedLimits::default(),
                Arc::new(UrlPrefixMediaResolver::new("https://cdn.test")),
            );
            let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
                secret: "handler-test-secret".to_string(),
                expiration_hours: 1,
                issuer: "feedline-test".to_string(),
            }));

            Self {
                store,
                state,
                tokens,
            }
        }

        async fn post(&self, author_id: Uuid, media: &[&str]) -> Post {
            let post = Post::new(
                author_id,
                Some("hello".to_string()),
                media.iter().map(|m| m.to_string()).collect(),
            );
            BaseRepository::<Post, Uuid>::save(self.store.as_ref(), post)
                .await
                .unwrap()
        }

        fn bearer(&self, user_id: Uuid) -> (header::HeaderName, String) {
            let token = self.tokens.generate_token(user_id, "user").unwrap();
            (header::AUTHORIZATION, format!("Bearer {}", token))
        }
    }

    macro_rules! app {
        ($harness:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($harness.state.clone()))
                    .app_data(web::Data::new($harness.tokens.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_feed_requires_bearer_token() {
        let harness = Harness::new();
        let app = app!(harness);

        let req = test::TestRequest::get().uri("/api/feed").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_feed_page_resolves_media_and_clamps_limit() {
        let harness = Harness::new();
        let viewer = Uuid::new_v4();
        let author = Uuid::new_v4();
        harness.post(author, &["a.jpg"]).await;
        harness.post(author, &["b.jpg"]).await;
        let app = app!(harness);

        let req = test::TestRequest::get()
            .uri("/api/feed?page=0&limit=500")
            .insert_header(harness.bearer(viewer))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let data = &body["data"];
        assert_eq!(data["pagination"]["page"], 1);
        assert_eq!(data["pagination"]["limit"], 100);
        assert_eq!(data["pagination"]["total"], 2);
        let items = data["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        for item in items {
            assert_eq!(item["tier"], "others");
            let url = item["media"][0].as_str().unwrap();
            assert!(url.starts_with("https://cdn.test/"));
        }
    }

    #[actix_web::test]
    async fn test_like_toggle_round_trip() {
        let harness = Harness::new();
        let viewer = Uuid::new_v4();
        let post = harness.post(Uuid::new_v4(), &[]).await;
        let app = app!(harness);
        let uri = format!("/api/posts/{}/like", post.id);

        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(harness.bearer(viewer))
            .to_request();
        let liked: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(harness.bearer(viewer))
            .to_request();
        let unliked: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(liked["data"]["active"], true);
        assert_eq!(liked["data"]["count"], 1);
        assert_eq!(unliked["data"]["active"], false);
        assert_eq!(unliked["data"]["count"], 0);
    }

    #[actix_web::test]
    async fn test_blocked_post_reads_as_not_found() {
        let harness = Harness::new();
        let viewer = Uuid::new_v4();
        let author = Uuid::new_v4();
        let post = harness.post(author, &[]).await;
        BlockGraph::toggle(harness.store.as_ref(), author, viewer)
            .await
            .unwrap();
        let app = app!(harness);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", post.id))
            .insert_header(harness.bearer(viewer))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_self_block_is_rejected() {
        let harness = Harness::new();
        let viewer = Uuid::new_v4();
        let app = app!(harness);

        let req = test::TestRequest::post()
            .uri(&format!("/api/users/{}/block", viewer))
            .insert_header(harness.bearer(viewer))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
