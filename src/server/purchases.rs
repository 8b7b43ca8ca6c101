use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::access::resolve_access;
use crate::auth::RequireUser;
use crate::entitlements;
use crate::server::AppState;
use crate::server::dto::PurchaseVideoResponse;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

pub async fn check_access(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> impl IntoResponse {
    let verdict = resolve_access(state.store.as_ref(), &auth.user.id, &video_id)
        .map_err(ApiError::from)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(verdict)))
}

pub async fn purchase_video(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> impl IntoResponse {
    let receipt = entitlements::purchase_video(
        state.store.as_ref(),
        state.payment.as_ref(),
        &auth.user.id,
        &video_id,
    )
    .map_err(ApiError::from)?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(PurchaseVideoResponse {
            purchase_id: receipt.purchase_id,
            amount_cents: receipt.amount_cents,
        })),
    ))
}

pub async fn my_purchases(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let purchases = state
        .store
        .list_user_purchases(&auth.user.id)
        .api_err("Failed to list purchases")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(purchases)))
}
