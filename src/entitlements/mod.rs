//! Purchase and subscription flows: the multi-row writes behind every
//! entitlement. Business rules are checked before any write, the payment
//! charge settles next, and only then do rows land in the store. A declined
//! charge therefore leaves entitlement state untouched.

use chrono::{Months, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::payment::{ChargePurpose, PaymentError, PaymentProcessor};
use crate::store::Store;
use crate::types::*;

/// Result of an individual video purchase.
#[derive(Debug)]
pub struct VideoPurchaseReceipt {
    pub purchase_id: String,
    pub amount_cents: i64,
}

/// Result of a bundle purchase.
#[derive(Debug)]
pub struct BundlePurchaseReceipt {
    pub bundle_purchase_id: String,
    pub videos_unlocked: usize,
}

/// Result of a subscribe call.
#[derive(Debug)]
pub struct SubscribeReceipt {
    pub subscription_id: String,
    pub period_end: chrono::DateTime<Utc>,
}

fn map_payment_error(e: PaymentError) -> Error {
    match e {
        PaymentError::Declined(msg) => Error::PaymentDeclined(msg),
        PaymentError::Unavailable(msg) => Error::Config(msg),
    }
}

pub fn purchase_video(
    store: &dyn Store,
    payment: &dyn PaymentProcessor,
    user_id: &str,
    video_id: &str,
) -> Result<VideoPurchaseReceipt> {
    let video = store.get_video(video_id)?.ok_or(Error::NotFound)?;

    if video.price_cents == 0 {
        return Err(Error::BadRequest("video is free, no purchase needed".into()));
    }

    if video.creator_id == user_id {
        return Err(Error::BadRequest("cannot purchase your own video".into()));
    }

    // Any-type check: a bundle-derived entitlement already unlocks the video.
    if store.get_purchase_any_type(user_id, video_id)?.is_some() {
        return Err(Error::BadRequest("video already purchased".into()));
    }

    let payment_ref = payment
        .charge(
            user_id,
            video.price_cents,
            &ChargePurpose::Video(video.id.clone()),
        )
        .map_err(map_payment_error)?;

    let purchase = Purchase {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        video_id: video.id.clone(),
        purchase_type: PurchaseType::Individual,
        amount_cents: video.price_cents,
        payment_ref: payment_ref.0,
        created_at: Utc::now(),
    };
    store.create_purchase(&purchase)?;

    Ok(VideoPurchaseReceipt {
        purchase_id: purchase.id,
        amount_cents: purchase.amount_cents,
    })
}

pub fn purchase_bundle(
    store: &dyn Store,
    payment: &dyn PaymentProcessor,
    user_id: &str,
    bundle_id: &str,
    selected_video_ids: &[String],
) -> Result<BundlePurchaseReceipt> {
    let bundle = store
        .get_bundle(bundle_id)?
        .filter(|b| b.is_active)
        .ok_or(Error::NotFound)?;

    if selected_video_ids.len() as i64 != bundle.video_count {
        return Err(Error::BadRequest(format!(
            "please select exactly {} videos",
            bundle.video_count
        )));
    }

    // Counting distinct owned matches catches both duplicate selections and
    // videos belonging to another creator.
    let owned = store.count_owned_videos(selected_video_ids, &bundle.creator_id)?;
    if owned != bundle.video_count {
        return Err(Error::BadRequest("invalid video selection".into()));
    }

    let payment_ref = payment
        .charge(
            user_id,
            bundle.price_cents,
            &ChargePurpose::Bundle(bundle.id.clone()),
        )
        .map_err(map_payment_error)?;

    let purchase = BundlePurchase {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        bundle_id: bundle.id.clone(),
        amount_cents: bundle.price_cents,
        payment_ref: payment_ref.0,
        created_at: Utc::now(),
    };
    store.create_bundle_purchase(&purchase, selected_video_ids)?;

    Ok(BundlePurchaseReceipt {
        bundle_purchase_id: purchase.id,
        videos_unlocked: selected_video_ids.len(),
    })
}

pub fn subscribe(
    store: &dyn Store,
    payment: &dyn PaymentProcessor,
    user_id: &str,
    plan_id: &str,
) -> Result<SubscribeReceipt> {
    let plan = store
        .get_plan(plan_id)?
        .filter(|p| p.is_active)
        .ok_or(Error::NotFound)?;

    if let Some(existing) = store.get_user_subscription(user_id, plan_id)? {
        if existing.status == SubscriptionStatus::Active {
            return Err(Error::BadRequest("already subscribed".into()));
        }
    }

    let payment_ref = payment
        .charge(
            user_id,
            plan.monthly_price_cents,
            &ChargePurpose::Subscription(plan.id.clone()),
        )
        .map_err(map_payment_error)?;

    let now = Utc::now();
    // Calendar month, not a fixed 30 days. Clamps at month ends
    // (Jan 31 + 1 month = Feb 28/29).
    let period_end = now
        .checked_add_months(Months::new(1))
        .ok_or_else(|| Error::Config("period end out of range".into()))?;

    let sub = UserSubscription {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        plan_id: plan.id.clone(),
        status: SubscriptionStatus::Active,
        current_period_start: now,
        current_period_end: period_end,
        payment_ref: payment_ref.0,
        created_at: now,
        updated_at: now,
    };
    store.upsert_user_subscription(&sub)?;

    // The upsert keeps the original row id when re-subscribing, so read the
    // stored row back for the id we report.
    let stored = store
        .get_user_subscription(user_id, plan_id)?
        .ok_or(Error::NotFound)?;

    Ok(SubscribeReceipt {
        subscription_id: stored.id,
        period_end,
    })
}

pub fn unsubscribe(store: &dyn Store, user_id: &str, subscription_id: &str) -> Result<()> {
    let sub = store
        .get_user_subscription_by_id(subscription_id)?
        .filter(|s| s.user_id == user_id)
        .ok_or(Error::NotFound)?;

    // Immediate revoke: the resolver requires both active status and an
    // unexpired period, so flipping the status cuts access right away.
    store.cancel_user_subscription(&sub.id)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::access::resolve_access;
    use crate::payment::mock::MockProcessor;
    use crate::store::SqliteStore;

    struct Fixture {
        store: SqliteStore,
        payment: MockProcessor,
        creator: User,
        viewer: User,
    }

    impl Fixture {
        fn new() -> Self {
            let store = SqliteStore::new_in_memory().unwrap();
            store.initialize().unwrap();
            let creator = Self::user(&store, "creator@example.com", true);
            let viewer = Self::user(&store, "viewer@example.com", false);
            Self {
                store,
                payment: MockProcessor::default(),
                creator,
                viewer,
            }
        }

        fn user(store: &SqliteStore, email: &str, is_creator: bool) -> User {
            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4().to_string(),
                email: email.to_string(),
                password_hash: "$argon2id$test".to_string(),
                name: "Test".to_string(),
                is_creator,
                created_at: now,
                updated_at: now,
            };
            store.create_user(&user).unwrap();
            user
        }

        fn video(&self, price_cents: i64) -> Video {
            let now = Utc::now();
            let video = Video {
                id: Uuid::new_v4().to_string(),
                creator_id: self.creator.id.clone(),
                media_id: "abc123".to_string(),
                media_url: "https://youtube.com/watch?v=abc123".to_string(),
                title: "Video".to_string(),
                thumbnail_url: None,
                price_cents,
                created_at: now,
                updated_at: now,
            };
            self.store.create_video(&video).unwrap();
            video
        }

        fn bundle(&self, video_count: i64, price_cents: i64) -> Bundle {
            let now = Utc::now();
            let bundle = Bundle {
                id: Uuid::new_v4().to_string(),
                creator_id: self.creator.id.clone(),
                name: "Pack".to_string(),
                video_count,
                price_cents,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            self.store.create_bundle(&bundle).unwrap();
            bundle
        }

        fn plan(&self) -> SubscriptionPlan {
            let now = Utc::now();
            let plan = SubscriptionPlan {
                id: Uuid::new_v4().to_string(),
                creator_id: self.creator.id.clone(),
                monthly_price_cents: 999,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            self.store.create_plan(&plan).unwrap();
            plan
        }

        fn purchase_count(&self) -> i64 {
            self.store
                .connection()
                .query_row("SELECT COUNT(*) FROM purchases", [], |row| row.get(0))
                .unwrap()
        }
    }

    #[test]
    fn purchase_then_access_end_to_end() {
        let fx = Fixture::new();
        let video = fx.video(500);

        let before = resolve_access(&fx.store, &fx.viewer.id, &video.id).unwrap();
        assert!(!before.has_access);
        assert_eq!(before.reason, AccessReason::NotPurchased);

        let receipt = purchase_video(&fx.store, &fx.payment, &fx.viewer.id, &video.id).unwrap();
        assert_eq!(receipt.amount_cents, 500);

        let after = resolve_access(&fx.store, &fx.viewer.id, &video.id).unwrap();
        assert!(after.has_access);
        assert_eq!(after.reason, AccessReason::Purchased);

        let charges = fx.payment.charges();
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].amount_cents, 500);
    }

    #[test]
    fn purchase_is_rejected_the_second_time() {
        let fx = Fixture::new();
        let video = fx.video(500);

        purchase_video(&fx.store, &fx.payment, &fx.viewer.id, &video.id).unwrap();
        let second = purchase_video(&fx.store, &fx.payment, &fx.viewer.id, &video.id);
        assert!(matches!(second, Err(Error::BadRequest(_))));
        assert_eq!(fx.purchase_count(), 1);
        // The duplicate never reached the payment layer.
        assert_eq!(fx.payment.charges().len(), 1);
    }

    #[test]
    fn free_video_cannot_be_purchased() {
        let fx = Fixture::new();
        let video = fx.video(0);

        let result = purchase_video(&fx.store, &fx.payment, &fx.viewer.id, &video.id);
        assert!(matches!(result, Err(Error::BadRequest(_))));
        assert_eq!(fx.purchase_count(), 0);
        assert!(fx.payment.charges().is_empty());
    }

    #[test]
    fn creator_cannot_purchase_own_video() {
        let fx = Fixture::new();
        let video = fx.video(500);

        let result = purchase_video(&fx.store, &fx.payment, &fx.creator.id, &video.id);
        assert!(matches!(result, Err(Error::BadRequest(_))));
        assert_eq!(fx.purchase_count(), 0);
    }

    #[test]
    fn declined_charge_writes_nothing() {
        let fx = Fixture::new();
        let video = fx.video(500);

        fx.payment.decline_next();
        let result = purchase_video(&fx.store, &fx.payment, &fx.viewer.id, &video.id);
        assert!(matches!(result, Err(Error::PaymentDeclined(_))));
        assert_eq!(fx.purchase_count(), 0);

        // The next attempt goes through.
        purchase_video(&fx.store, &fx.payment, &fx.viewer.id, &video.id).unwrap();
        assert_eq!(fx.purchase_count(), 1);
    }

    #[test]
    fn bundle_purchase_unlocks_selected_videos_only() {
        let fx = Fixture::new();
        let videos: Vec<_> = (0..4).map(|_| fx.video(1000)).collect();
        let bundle = fx.bundle(3, 1000);
        let selection: Vec<String> = videos[0..3].iter().map(|v| v.id.clone()).collect();

        let receipt =
            purchase_bundle(&fx.store, &fx.payment, &fx.viewer.id, &bundle.id, &selection)
                .unwrap();
        assert_eq!(receipt.videos_unlocked, 3);

        for video in &videos[0..3] {
            let verdict = resolve_access(&fx.store, &fx.viewer.id, &video.id).unwrap();
            assert!(verdict.has_access);
            assert_eq!(verdict.reason, AccessReason::Bundle);
        }
        let locked = resolve_access(&fx.store, &fx.viewer.id, &videos[3].id).unwrap();
        assert!(!locked.has_access);
    }

    #[test]
    fn bundle_selection_count_must_match() {
        let fx = Fixture::new();
        let videos: Vec<_> = (0..3).map(|_| fx.video(1000)).collect();
        let bundle = fx.bundle(3, 1000);
        let short: Vec<String> = videos[0..2].iter().map(|v| v.id.clone()).collect();

        let result = purchase_bundle(&fx.store, &fx.payment, &fx.viewer.id, &bundle.id, &short);
        assert!(matches!(result, Err(Error::BadRequest(_))));
        assert_eq!(fx.purchase_count(), 0);
        assert!(fx.payment.charges().is_empty());
    }

    #[test]
    fn bundle_selection_rejects_duplicates_and_foreign_videos() {
        let fx = Fixture::new();
        let videos: Vec<_> = (0..3).map(|_| fx.video(1000)).collect();
        let bundle = fx.bundle(3, 1000);

        let dup = vec![
            videos[0].id.clone(),
            videos[0].id.clone(),
            videos[1].id.clone(),
        ];
        let result = purchase_bundle(&fx.store, &fx.payment, &fx.viewer.id, &bundle.id, &dup);
        assert!(matches!(result, Err(Error::BadRequest(_))));

        let other = Fixture::user(&fx.store, "other@example.com", true);
        let foreign = {
            let now = Utc::now();
            let video = Video {
                id: Uuid::new_v4().to_string(),
                creator_id: other.id.clone(),
                media_id: "zzz".to_string(),
                media_url: "https://youtube.com/watch?v=zzz".to_string(),
                title: "Foreign".to_string(),
                thumbnail_url: None,
                price_cents: 1000,
                created_at: now,
                updated_at: now,
            };
            fx.store.create_video(&video).unwrap();
            video
        };
        let mixed = vec![
            videos[0].id.clone(),
            videos[1].id.clone(),
            foreign.id.clone(),
        ];
        let result = purchase_bundle(&fx.store, &fx.payment, &fx.viewer.id, &bundle.id, &mixed);
        assert!(matches!(result, Err(Error::BadRequest(_))));
        assert_eq!(fx.purchase_count(), 0);
    }

    #[test]
    fn inactive_bundle_is_not_found() {
        let fx = Fixture::new();
        let videos: Vec<_> = (0..2).map(|_| fx.video(1000)).collect();
        let mut bundle = fx.bundle(2, 1000);
        bundle.is_active = false;
        fx.store.update_bundle(&bundle).unwrap();

        let selection: Vec<String> = videos.iter().map(|v| v.id.clone()).collect();
        let result =
            purchase_bundle(&fx.store, &fx.payment, &fx.viewer.id, &bundle.id, &selection);
        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[test]
    fn subscribe_sets_a_calendar_month_period() {
        let fx = Fixture::new();
        let plan = fx.plan();

        let before = Utc::now();
        let receipt = subscribe(&fx.store, &fx.payment, &fx.viewer.id, &plan.id).unwrap();

        let lower = before.checked_add_months(Months::new(1)).unwrap();
        assert!(receipt.period_end >= lower - Duration::seconds(1));
        assert!(receipt.period_end <= lower + Duration::seconds(5));
    }

    #[test]
    fn double_subscribe_is_rejected() {
        let fx = Fixture::new();
        let plan = fx.plan();

        subscribe(&fx.store, &fx.payment, &fx.viewer.id, &plan.id).unwrap();
        let second = subscribe(&fx.store, &fx.payment, &fx.viewer.id, &plan.id);
        assert!(matches!(second, Err(Error::BadRequest(_))));
        assert_eq!(fx.payment.charges().len(), 1);
    }

    #[test]
    fn unsubscribe_then_resubscribe_reuses_the_row() {
        let fx = Fixture::new();
        let plan = fx.plan();

        let first = subscribe(&fx.store, &fx.payment, &fx.viewer.id, &plan.id).unwrap();
        unsubscribe(&fx.store, &fx.viewer.id, &first.subscription_id).unwrap();

        // Cancelled while unexpired: access is revoked immediately.
        let video = fx.video(500);
        let verdict = resolve_access(&fx.store, &fx.viewer.id, &video.id).unwrap();
        assert!(!verdict.has_access);

        let second = subscribe(&fx.store, &fx.payment, &fx.viewer.id, &plan.id).unwrap();
        assert_eq!(second.subscription_id, first.subscription_id);

        let rows: i64 = fx
            .store
            .connection()
            .query_row("SELECT COUNT(*) FROM user_subscriptions", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn unsubscribe_rejects_foreign_rows() {
        let fx = Fixture::new();
        let plan = fx.plan();
        let receipt = subscribe(&fx.store, &fx.payment, &fx.viewer.id, &plan.id).unwrap();

        let stranger = Fixture::user(&fx.store, "stranger@example.com", false);
        let result = unsubscribe(&fx.store, &stranger.id, &receipt.subscription_id);
        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[test]
    fn declined_subscription_charge_writes_nothing() {
        let fx = Fixture::new();
        let plan = fx.plan();

        fx.payment.decline_next();
        let result = subscribe(&fx.store, &fx.payment, &fx.viewer.id, &plan.id);
        assert!(matches!(result, Err(Error::PaymentDeclined(_))));

        let rows: i64 = fx
            .store
            .connection()
            .query_row("SELECT COUNT(*) FROM user_subscriptions", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(rows, 0);
    }
}
