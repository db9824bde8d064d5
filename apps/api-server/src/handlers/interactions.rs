//! Like and save toggles.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use feedline_core::domain::ToggleOutcome;
use feedline_shared::ApiResponse;
use feedline_shared::dto::ToggleResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{id}/like
pub async fn like_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .interactions
        .toggle_post_like(identity.viewer(), path.into_inner())
        .await?;

    Ok(toggled(outcome))
}

/// POST /api/posts/{id}/save
pub async fn save_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .interactions
        .toggle_post_save(identity.viewer(), path.into_inner())
        .await?;

    Ok(toggled(outcome))
}

/// POST /api/comments/{id}/like
pub async fn like_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .interactions
        .toggle_comment_like(identity.viewer(), path.into_inner())
        .await?;

    Ok(toggled(outcome))
}

fn toggled(outcome: ToggleOutcome) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(ToggleResponse {
        active: outcome.active,
        count: outcome.count,
    }))
}
