use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One audited stage of a price computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

impl PricingStep {
    pub fn new(stage: impl Into<String>, detail: impl Into<String>, amount: Decimal) -> Self {
        Self {
            stage: stage.into(),
            detail: detail.into(),
            amount,
        }
    }
}

/// Coupon deduction recorded on a breakdown.
///
/// `original_price` is the pre-coupon total. Re-applying a coupon starts from
/// it again, so discounts never compound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    pub code: String,
    pub amount: Decimal,
    pub original_price: Decimal,
}

/// Full price decomposition returned by the quote engine.
///
/// All money fields are order totals in `currency`; `discount_per_day` is the
/// per-eSIM day rate the proration used.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub base_cost: Decimal,
    pub markup: Decimal,
    pub total_before_discount: Decimal,
    pub unused_days: u32,
    pub discount_per_day: Decimal,
    pub discount_amount: Decimal,
    pub total_after_discount: Decimal,
    pub processing_rate: Decimal,
    pub processing_cost: Decimal,
    pub final_price: Decimal,
    pub net_profit: Decimal,
    /// Set when a profit floor could not be satisfied at any price.
    pub profit_shortfall: bool,
    pub currency: String,
    #[serde(default)]
    pub steps: Vec<PricingStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<AppliedDiscount>,
}
