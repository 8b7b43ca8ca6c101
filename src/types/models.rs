use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub name: String,
    pub is_creator: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Prices are stored in integer cents. A price of 0 marks a free video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub creator_id: String,
    pub media_id: String,
    pub media_url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// "Pick any `video_count` videos from this creator for a flat price."
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub id: String,
    pub creator_id: String,
    pub name: String,
    pub video_count: i64,
    pub price_cents: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A creator's monthly subscription offering. At most one per creator,
/// enforced by a unique constraint on `creator_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: String,
    pub creator_id: String,
    pub monthly_price_cents: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
}

impl SubscriptionStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SubscriptionStatus::Active),
            "cancelled" => Some(SubscriptionStatus::Cancelled),
            _ => None,
        }
    }
}

/// One row per (user, plan). Re-subscribing after cancellation updates the
/// same row rather than inserting a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSubscription {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub payment_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseType {
    Individual,
    Bundle,
}

impl PurchaseType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseType::Individual => "individual",
            PurchaseType::Bundle => "bundle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "individual" => Some(PurchaseType::Individual),
            "bundle" => Some(PurchaseType::Bundle),
            _ => None,
        }
    }
}

/// A per-video entitlement. Bundle-derived rows carry `amount_cents = 0`;
/// the cost is attributed to the parent bundle purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    pub user_id: String,
    pub video_id: String,
    pub purchase_type: PurchaseType,
    pub amount_cents: i64,
    pub payment_ref: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundlePurchase {
    pub id: String,
    pub user_id: String,
    pub bundle_id: String,
    pub amount_cents: i64,
    pub payment_ref: String,
    pub created_at: DateTime<Utc>,
}

/// Why access was granted or denied. Serialized into API responses, so the
/// names are part of the public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    Free,
    Creator,
    Purchased,
    Subscription,
    Bundle,
    NotPurchased,
}

/// The result of access resolution for a (user, video) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Verdict {
    pub has_access: bool,
    pub reason: AccessReason,
}

impl Verdict {
    #[must_use]
    pub fn granted(reason: AccessReason) -> Self {
        Self {
            has_access: true,
            reason,
        }
    }

    #[must_use]
    pub fn denied() -> Self {
        Self {
            has_access: false,
            reason: AccessReason::NotPurchased,
        }
    }
}

/// A purchase joined with the video it unlocked, for library listings.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseWithVideo {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub title: String,
    pub media_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// An active subscription joined with its plan and creator.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionWithPlan {
    #[serde(flatten)]
    pub subscription: UserSubscription,
    pub monthly_price_cents: i64,
    pub creator_id: String,
    pub creator_name: String,
}
