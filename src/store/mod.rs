mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn set_user_creator(&self, id: &str) -> Result<()>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;

    // Video operations
    fn create_video(&self, video: &Video) -> Result<()>;
    fn get_video(&self, id: &str) -> Result<Option<Video>>;
    fn list_videos(&self) -> Result<Vec<Video>>;
    fn list_creator_videos(&self, creator_id: &str) -> Result<Vec<Video>>;
    fn update_video(&self, video: &Video) -> Result<()>;
    fn delete_video(&self, id: &str) -> Result<bool>;
    /// Counts videos whose id is in `ids` and whose owner is `creator_id`.
    /// Duplicate ids in the slice are counted once, which is what makes the
    /// bundle selection count check catch duplicates.
    fn count_owned_videos(&self, ids: &[String], creator_id: &str) -> Result<i64>;

    // Bundle operations
    fn create_bundle(&self, bundle: &Bundle) -> Result<()>;
    fn get_bundle(&self, id: &str) -> Result<Option<Bundle>>;
    fn list_creator_bundles(&self, creator_id: &str, active_only: bool) -> Result<Vec<Bundle>>;
    fn update_bundle(&self, bundle: &Bundle) -> Result<()>;
    fn delete_bundle(&self, id: &str) -> Result<bool>;

    // Subscription plan operations
    /// Fails with `Error::Conflict` if the creator already has a plan.
    fn create_plan(&self, plan: &SubscriptionPlan) -> Result<()>;
    fn get_plan(&self, id: &str) -> Result<Option<SubscriptionPlan>>;
    fn get_creator_plan(&self, creator_id: &str, active_only: bool)
    -> Result<Option<SubscriptionPlan>>;
    fn update_plan(&self, plan: &SubscriptionPlan) -> Result<()>;
    fn delete_plan(&self, id: &str) -> Result<bool>;

    // User subscription operations
    fn get_user_subscription(&self, user_id: &str, plan_id: &str)
    -> Result<Option<UserSubscription>>;
    fn get_user_subscription_by_id(&self, id: &str) -> Result<Option<UserSubscription>>;
    /// Insert-or-update on (user_id, plan_id). Re-subscribing after a
    /// cancellation reactivates the existing row.
    fn upsert_user_subscription(&self, sub: &UserSubscription) -> Result<()>;
    fn cancel_user_subscription(&self, id: &str) -> Result<()>;
    fn list_active_subscriptions(&self, user_id: &str) -> Result<Vec<SubscriptionWithPlan>>;
    /// True if the user holds an unexpired active subscription to any plan
    /// owned by `creator_id`.
    fn has_active_subscription(
        &self,
        user_id: &str,
        creator_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    // Purchase operations
    fn create_purchase(&self, purchase: &Purchase) -> Result<()>;
    /// Any-type lookup: an individual purchase is blocked when a
    /// bundle-derived row for the same video already exists, and vice versa.
    fn get_purchase_any_type(&self, user_id: &str, video_id: &str) -> Result<Option<Purchase>>;
    fn has_purchase(&self, user_id: &str, video_id: &str, purchase_type: PurchaseType)
    -> Result<bool>;
    fn list_user_purchases(&self, user_id: &str) -> Result<Vec<PurchaseWithVideo>>;

    // Bundle purchase operations
    /// Writes the parent row, one junction row per video, and one
    /// bundle-type purchase row per video in a single transaction. Any
    /// failure rolls the whole sequence back.
    fn create_bundle_purchase(
        &self,
        purchase: &BundlePurchase,
        video_ids: &[String],
    ) -> Result<()>;
    fn has_bundle_access(&self, user_id: &str, video_id: &str) -> Result<bool>;
}
