use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{RequireCreator, RequireUser};
use crate::entitlements;
use crate::server::AppState;
use crate::server::dto::{
    CreateBundleRequest, PurchaseBundleRequest, PurchaseBundleResponse, UpdateBundleRequest,
};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{validate_positive_price, validate_title, validate_video_count};
use crate::types::Bundle;

pub async fn list_creator_bundles(
    State(state): State<Arc<AppState>>,
    Path(creator_id): Path<String>,
) -> impl IntoResponse {
    let bundles = state
        .store
        .list_creator_bundles(&creator_id, true)
        .api_err("Failed to list bundles")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(bundles)))
}

pub async fn create_bundle(
    auth: RequireCreator,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBundleRequest>,
) -> impl IntoResponse {
    validate_title(&req.name)?;
    validate_video_count(req.video_count)?;
    validate_positive_price(req.price_cents)?;

    let now = Utc::now();
    let bundle = Bundle {
        id: Uuid::new_v4().to_string(),
        creator_id: auth.user.id,
        name: req.name,
        video_count: req.video_count,
        price_cents: req.price_cents,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_bundle(&bundle)
        .api_err("Failed to create bundle")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(bundle))))
}

pub async fn update_bundle(
    auth: RequireCreator,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBundleRequest>,
) -> impl IntoResponse {
    let mut bundle = state
        .store
        .get_bundle(&id)
        .api_err("Failed to get bundle")?
        .or_not_found("Bundle not found")?;

    if bundle.creator_id != auth.user.id {
        return Err(ApiError::forbidden("Not authorized to update this bundle"));
    }

    if let Some(name) = req.name {
        validate_title(&name)?;
        bundle.name = name;
    }
    if let Some(video_count) = req.video_count {
        validate_video_count(video_count)?;
        bundle.video_count = video_count;
    }
    if let Some(price_cents) = req.price_cents {
        validate_positive_price(price_cents)?;
        bundle.price_cents = price_cents;
    }
    if let Some(is_active) = req.is_active {
        bundle.is_active = is_active;
    }

    state
        .store
        .update_bundle(&bundle)
        .api_err("Failed to update bundle")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(bundle)))
}

pub async fn delete_bundle(
    auth: RequireCreator,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let bundle = state
        .store
        .get_bundle(&id)
        .api_err("Failed to get bundle")?
        .or_not_found("Bundle not found")?;

    if bundle.creator_id != auth.user.id {
        return Err(ApiError::forbidden("Not authorized to delete this bundle"));
    }

    state
        .store
        .delete_bundle(&bundle.id)
        .api_err("Failed to delete bundle")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn purchase_bundle(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PurchaseBundleRequest>,
) -> impl IntoResponse {
    let receipt = entitlements::purchase_bundle(
        state.store.as_ref(),
        state.payment.as_ref(),
        &auth.user.id,
        &id,
        &req.selected_video_ids,
    )
    .map_err(ApiError::from)?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(PurchaseBundleResponse {
            bundle_purchase_id: receipt.bundle_purchase_id,
            videos_unlocked: receipt.videos_unlocked,
        })),
    ))
}
