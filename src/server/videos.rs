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
use crate::server::dto::{CreateVideoRequest, UpdateVideoRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{
    extract_media_id, validate_title, validate_video_price,
};
use crate::types::Video;

pub async fn list_videos(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let videos = state
        .store
        .list_videos()
        .api_err("Failed to list videos")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(videos)))
}

pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let video = state
        .store
        .get_video(&id)
        .api_err("Failed to get video")?
        .or_not_found("Video not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(video)))
}

pub async fn list_creator_videos(
    State(state): State<Arc<AppState>>,
    Path(creator_id): Path<String>,
) -> impl IntoResponse {
    let videos = state
        .store
        .list_creator_videos(&creator_id)
        .api_err("Failed to list videos")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(videos)))
}

pub async fn create_video(
    auth: RequireCreator,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateVideoRequest>,
) -> impl IntoResponse {
    validate_title(&req.title)?;
    validate_video_price(req.price_cents)?;
    let media_id = extract_media_id(&req.media_url)?;

    let now = Utc::now();
    let video = Video {
        id: Uuid::new_v4().to_string(),
        creator_id: auth.user.id,
        media_id,
        media_url: req.media_url,
        title: req.title,
        thumbnail_url: req.thumbnail_url,
        price_cents: req.price_cents,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_video(&video)
        .api_err("Failed to create video")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(video))))
}

pub async fn update_video(
    auth: RequireCreator,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateVideoRequest>,
) -> impl IntoResponse {
    let mut video = state
        .store
        .get_video(&id)
        .api_err("Failed to get video")?
        .or_not_found("Video not found")?;

    // 404 before 403: a missing video never reveals ownership.
    if video.creator_id != auth.user.id {
        return Err(ApiError::forbidden("Not authorized to update this video"));
    }

    if let Some(title) = req.title {
        validate_title(&title)?;
        video.title = title;
    }
    if let Some(price_cents) = req.price_cents {
        validate_video_price(price_cents)?;
        video.price_cents = price_cents;
    }
    if let Some(thumbnail_url) = req.thumbnail_url {
        video.thumbnail_url = Some(thumbnail_url);
    }

    state
        .store
        .update_video(&video)
        .api_err("Failed to update video")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(video)))
}

pub async fn delete_video(
    auth: RequireCreator,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let video = state
        .store
        .get_video(&id)
        .api_err("Failed to get video")?
        .or_not_found("Video not found")?;

    if video.creator_id != auth.user.id {
        return Err(ApiError::forbidden("Not authorized to delete this video"));
    }

    state
        .store
        .delete_video(&video.id)
        .api_err("Failed to delete video")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
