use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{SubscriptionStatus, User};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sanitized user view returned by the auth endpoints.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub is_creator: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_creator: user.is_creator,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub media_url: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVideoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBundleRequest {
    pub name: String,
    pub video_count: i64,
    pub price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBundleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub video_count: Option<i64>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseBundleRequest {
    pub selected_video_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PurchaseVideoResponse {
    pub purchase_id: String,
    pub amount_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct PurchaseBundleResponse {
    pub bundle_purchase_id: String,
    pub videos_unlocked: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub monthly_price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlanRequest {
    #[serde(default)]
    pub monthly_price_cents: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub subscription_id: String,
    pub period_end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UnsubscribeResponse {
    pub id: String,
    pub status: SubscriptionStatus,
}
