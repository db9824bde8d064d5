//! Feed and single-post reads.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use feedline_core::domain::{FeedItem, FeedPage, FeedTier, PageRequest};
use feedline_core::ports::MediaResolver;
use feedline_shared::ApiResponse;
use feedline_shared::dto::{
    AuthorResponse, FeedItemResponse, FeedPageResponse, FeedQueryParams, PaginationMeta,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/feed?page=&limit=
pub async fn get_feed(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<FeedQueryParams>,
) -> AppResult<HttpResponse> {
    let params = query.into_inner();
    let page = state
        .feed
        .get_feed(identity.viewer(), PageRequest::new(params.page, params.limit))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(page_response(page, state.media.as_ref()))))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let item = state
        .feed
        .get_post(identity.viewer(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(item_response(item, state.media.as_ref()))))
}

fn page_response(page: FeedPage, media: &dyn MediaResolver) -> FeedPageResponse {
    let pagination = PaginationMeta {
        page: page.page,
        limit: page.limit,
        total: page.total,
        total_pages: page.total_pages(),
    };

    FeedPageResponse {
        items: page
            .items
            .into_iter()
            .map(|item| item_response(item, media))
            .collect(),
        pagination,
    }
}

fn item_response(item: FeedItem, media: &dyn MediaResolver) -> FeedItemResponse {
    let tier = match item.tier {
        FeedTier::Followed => "followed",
        FeedTier::Others => "others",
        FeedTier::Seen => "seen",
    };

    FeedItemResponse {
        id: item.post.id.to_string(),
        author: AuthorResponse {
            id: item.author.id.to_string(),
            is_following: item.author.is_following,
        },
        media: media.resolve_all(&item.post.media),
        text: item.post.text,
        likes_count: item.post.likes_count,
        saves_count: item.post.saves_count,
        comments_count: item.post.comments_count,
        created_at: item.post.created_at.to_rfc3339(),
        tier: tier.to_string(),
        is_mine: item.is_mine,
        is_liked: item.is_liked,
        is_saved: item.is_saved,
        is_following: item.is_following,
    }
}
