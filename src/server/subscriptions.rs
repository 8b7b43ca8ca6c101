use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::entitlements;
use crate::server::AppState;
use crate::server::dto::{SubscribeResponse, UnsubscribeResponse};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::types::SubscriptionStatus;

pub async fn subscribe(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<String>,
) -> impl IntoResponse {
    let receipt = entitlements::subscribe(
        state.store.as_ref(),
        state.payment.as_ref(),
        &auth.user.id,
        &plan_id,
    )
    .map_err(ApiError::from)?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(SubscribeResponse {
            subscription_id: receipt.subscription_id,
            period_end: receipt.period_end,
        })),
    ))
}

pub async fn unsubscribe(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    entitlements::unsubscribe(state.store.as_ref(), &auth.user.id, &id)
        .map_err(ApiError::from)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(UnsubscribeResponse {
        id,
        status: SubscriptionStatus::Cancelled,
    })))
}

pub async fn my_subscriptions(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let subscriptions = state
        .store
        .list_active_subscriptions(&auth.user.id)
        .api_err("Failed to list subscriptions")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(subscriptions)))
}
