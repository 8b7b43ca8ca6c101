//! Pluggable payment capability.
//!
//! Entitlement rows are only written after `charge` returns a reference, so
//! a declined or failed charge leaves the store untouched. The shipped
//! [`StubProcessor`] approves everything; a real gateway adapter implements
//! the same trait.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// What a charge pays for. Carried into the gateway call and useful for
/// reconciliation on the provider side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum ChargePurpose {
    Video(String),
    Bundle(String),
    Subscription(String),
}

/// Opaque reference returned by the payment provider for a settled charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRef(pub String);

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("payment provider unavailable: {0}")]
    Unavailable(String),
}

pub trait PaymentProcessor: Send + Sync {
    /// Charges `amount_cents` against the user's payment method and returns
    /// a provider reference. Must not be called with a zero amount; free
    /// content never reaches the payment layer.
    fn charge(
        &self,
        user_id: &str,
        amount_cents: i64,
        purpose: &ChargePurpose,
    ) -> Result<PaymentRef, PaymentError>;
}

/// Development processor: approves every charge with a generated reference.
#[derive(Debug, Default)]
pub struct StubProcessor;

impl PaymentProcessor for StubProcessor {
    fn charge(
        &self,
        user_id: &str,
        amount_cents: i64,
        purpose: &ChargePurpose,
    ) -> Result<PaymentRef, PaymentError> {
        let reference = format!("stub_{}", Uuid::new_v4());
        tracing::debug!(
            "stub charge: user={user_id} amount_cents={amount_cents} purpose={purpose:?} ref={reference}"
        );
        Ok(PaymentRef(reference))
    }
}
