//! Access resolution: the decision function combining catalog state and
//! entitlement records into a verdict for one (user, video) pair.

use chrono::Utc;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{AccessReason, PurchaseType, Verdict};

/// Resolves whether `user_id` may view `video_id`.
///
/// Checks run in a fixed order and the first match wins. The order is part
/// of the contract: reasons are user-visible, and the cheap checks (price,
/// ownership) run before the ones that hit entitlement tables. Denial is a
/// normal verdict, not an error; only a missing video errors.
pub fn resolve_access(store: &dyn Store, user_id: &str, video_id: &str) -> Result<Verdict> {
    let video = store.get_video(video_id)?.ok_or(Error::NotFound)?;

    if video.price_cents == 0 {
        return Ok(Verdict::granted(AccessReason::Free));
    }

    if video.creator_id == user_id {
        return Ok(Verdict::granted(AccessReason::Creator));
    }

    if store.has_purchase(user_id, video_id, PurchaseType::Individual)? {
        return Ok(Verdict::granted(AccessReason::Purchased));
    }

    if store.has_active_subscription(user_id, &video.creator_id, Utc::now())? {
        return Ok(Verdict::granted(AccessReason::Subscription));
    }

    if store.has_bundle_access(user_id, video_id)? {
        return Ok(Verdict::granted(AccessReason::Bundle));
    }

    Ok(Verdict::denied())
}
