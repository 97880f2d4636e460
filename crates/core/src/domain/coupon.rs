use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Discount classes the checkout flow can redeem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CouponKind {
    Percentage,
    FixedAmount,
}

/// A redeemable coupon as stored in the coupon directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub is_active: bool,
    /// Stored verbatim; unrecognized types are rejected at redemption time.
    pub coupon_type: String,
    pub value: Decimal,
    #[serde(default)]
    pub max_discount: Option<Decimal>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}

impl Coupon {
    pub fn kind(&self) -> Option<CouponKind> {
        match self.coupon_type.as_str() {
            "percentage" => Some(CouponKind::Percentage),
            "fixed_amount" => Some(CouponKind::FixedAmount),
            _ => None,
        }
    }

    /// A coupon with no `valid_until` never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|deadline| deadline <= now)
    }
}
