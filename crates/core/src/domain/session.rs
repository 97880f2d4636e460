use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::breakdown::PricingBreakdown;

/// Identifier of a checkout session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

/// Context captured at quote time that coupon matching relies on later.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    #[serde(default)]
    pub country_iso: Option<String>,
    #[serde(default)]
    pub requested_duration_days: u32,
    #[serde(default)]
    pub bundle_name: Option<String>,
}

/// A checkout session holding the priced breakdown between quote and payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: SessionId,
    pub pricing: PricingBreakdown,
    #[serde(default)]
    pub metadata: SessionMetadata,
    pub updated_at: DateTime<Utc>,
}

impl CheckoutSession {
    /// Creates a session with a fresh `cs-` identifier.
    pub fn new(pricing: PricingBreakdown, metadata: SessionMetadata) -> Self {
        Self {
            id: SessionId(format!("cs-{}", Uuid::new_v4())),
            pricing,
            metadata,
            updated_at: Utc::now(),
        }
    }
}
