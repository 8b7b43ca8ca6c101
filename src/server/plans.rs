use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::RequireCreator;
use crate::server::AppState;
use crate::server::dto::{CreatePlanRequest, UpdatePlanRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_positive_price;
use crate::types::SubscriptionPlan;

/// Public: a creator's active plan, or null when they have none.
pub async fn get_creator_plan(
    State(state): State<Arc<AppState>>,
    Path(creator_id): Path<String>,
) -> impl IntoResponse {
    let plan = state
        .store
        .get_creator_plan(&creator_id, true)
        .api_err("Failed to get plan")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(plan)))
}

pub async fn create_plan(
    auth: RequireCreator,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePlanRequest>,
) -> impl IntoResponse {
    validate_positive_price(req.monthly_price_cents)?;

    let now = Utc::now();
    let plan = SubscriptionPlan {
        id: Uuid::new_v4().to_string(),
        creator_id: auth.user.id,
        monthly_price_cents: req.monthly_price_cents,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    // One plan per creator: the unique constraint turns a concurrent
    // duplicate into Conflict instead of racing a pre-check.
    state.store.create_plan(&plan).map_err(ApiError::from)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(plan))))
}

pub async fn update_plan(
    auth: RequireCreator,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePlanRequest>,
) -> impl IntoResponse {
    let mut plan = state
        .store
        .get_plan(&id)
        .api_err("Failed to get plan")?
        .or_not_found("Subscription plan not found")?;

    if plan.creator_id != auth.user.id {
        return Err(ApiError::forbidden("Not authorized to update this plan"));
    }

    if let Some(monthly_price_cents) = req.monthly_price_cents {
        validate_positive_price(monthly_price_cents)?;
        plan.monthly_price_cents = monthly_price_cents;
    }
    if let Some(is_active) = req.is_active {
        plan.is_active = is_active;
    }

    state
        .store
        .update_plan(&plan)
        .api_err("Failed to update plan")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(plan)))
}

pub async fn delete_plan(
    auth: RequireCreator,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let plan = state
        .store
        .get_plan(&id)
        .api_err("Failed to get plan")?
        .or_not_found("Subscription plan not found")?;

    if plan.creator_id != auth.user.id {
        return Err(ApiError::forbidden("Not authorized to delete this plan"));
    }

    state
        .store
        .delete_plan(&plan.id)
        .api_err("Failed to delete plan")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
