//! Block toggle.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use feedline_shared::ApiResponse;
use feedline_shared::dto::BlockResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/users/{id}/block
pub async fn toggle_block(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let target_id = path.into_inner();
    let block = state.blocks.toggle(identity.viewer(), target_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(BlockResponse {
        is_blocked: block.is_blocked,
    })))
}
