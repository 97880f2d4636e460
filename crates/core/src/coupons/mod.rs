pub mod continents;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::breakdown::{AppliedDiscount, PricingStep};
use crate::domain::coupon::{Coupon, CouponKind};
use crate::domain::session::{CheckoutSession, SessionId, SessionMetadata};
use crate::errors::{CouponError, StoreError};

/// Persistence seam for checkout sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find(&self, id: &SessionId) -> Result<Option<CheckoutSession>, StoreError>;
    async fn save(&self, session: &CheckoutSession) -> Result<(), StoreError>;
}

/// Lookup seam for stored coupons. Implementations match codes
/// case-insensitively.
#[async_trait]
pub trait CouponDirectory: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError>;
}

/// Auto-match candidates for a session: country code plus day count, and the
/// region token (from the country, or the bundle name as fallback) plus day
/// count. All lowercase, e.g. `it10` or `europe14`.
pub fn auto_match_codes(metadata: &SessionMetadata) -> Vec<String> {
    let days = metadata.requested_duration_days;
    let mut candidates = Vec::with_capacity(3);

    if let Some(iso) = &metadata.country_iso {
        let iso = iso.trim();
        if !iso.is_empty() {
            candidates.push(format!("{}{days}", iso.to_ascii_lowercase()));
        }
        if let Some(region) = continents::region_for_country(iso) {
            candidates.push(format!("{region}{days}"));
        }
    }
    if let Some(name) = &metadata.bundle_name {
        if let Some(region) = continents::region_for_bundle_name(name) {
            let candidate = format!("{region}{days}");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

/// Applies coupon codes to checkout sessions.
///
/// Two sources feed it: destination codes matched on the fly (`it10`,
/// `europe30`) and stored coupons from the directory. Either way the
/// deduction starts from the pre-coupon price, so codes replace each other
/// instead of stacking.
pub struct CouponResolver<S, D> {
    sessions: S,
    directory: D,
    auto_match_percent: Decimal,
}

impl<S, D> CouponResolver<S, D>
where
    S: SessionStore,
    D: CouponDirectory,
{
    pub fn new(sessions: S, directory: D) -> Self {
        Self {
            sessions,
            directory,
            auto_match_percent: Decimal::TEN,
        }
    }

    /// Overrides the flat percentage granted to auto-matched codes.
    pub fn with_auto_match_percent(mut self, percent: Decimal) -> Self {
        self.auto_match_percent = percent;
        self
    }

    /// Applies `submitted_code` to the session and persists the new pricing.
    pub async fn apply(
        &self,
        session_id: &SessionId,
        submitted_code: &str,
    ) -> Result<CheckoutSession, CouponError> {
        let mut session = self.sessions.find(session_id).await?.ok_or_else(|| {
            CouponError::SessionNotFound {
                session_id: session_id.0.clone(),
            }
        })?;

        let code = submitted_code.trim().to_ascii_lowercase();
        let original_price = session
            .pricing
            .discount
            .as_ref()
            .map(|applied| applied.original_price)
            .unwrap_or(session.pricing.final_price);

        let auto_matched = auto_match_codes(&session.metadata)
            .iter()
            .any(|candidate| *candidate == code);
        let amount = if auto_matched {
            original_price * self.auto_match_percent / Decimal::ONE_HUNDRED
        } else {
            self.directory_discount(&code, original_price).await?
        };
        let amount = amount.max(Decimal::ZERO).min(original_price);

        tracing::info!(
            event_name = "coupon.applied",
            session = %session.id.0,
            code = %code,
            auto_matched,
            amount = %amount,
        );

        let final_price = original_price - amount;
        session.pricing.final_price = final_price;
        session.pricing.processing_cost =
            final_price * session.pricing.processing_rate / Decimal::ONE_HUNDRED;
        session.pricing.net_profit =
            final_price - session.pricing.base_cost - session.pricing.processing_cost;
        session.pricing.discount = Some(AppliedDiscount {
            code: code.clone(),
            amount,
            original_price,
        });
        session.pricing.steps.push(PricingStep::new("coupon", code, amount));
        session.updated_at = Utc::now();

        self.sessions.save(&session).await?;
        Ok(session)
    }

    async fn directory_discount(
        &self,
        code: &str,
        original_price: Decimal,
    ) -> Result<Decimal, CouponError> {
        let coupon = self.directory.find_by_code(code).await?.ok_or_else(|| {
            CouponError::InvalidCoupon {
                code: code.to_string(),
            }
        })?;

        if !coupon.is_active {
            return Err(CouponError::CouponInactive {
                code: code.to_string(),
            });
        }
        if let Some(expired_at) = coupon.valid_until.filter(|_| coupon.is_expired(Utc::now())) {
            return Err(CouponError::CouponExpired {
                code: code.to_string(),
                expired_at,
            });
        }

        let amount = match coupon.kind() {
            Some(CouponKind::Percentage) => original_price * coupon.value / Decimal::ONE_HUNDRED,
            Some(CouponKind::FixedAmount) => coupon.value,
            None => {
                return Err(CouponError::UnsupportedCouponType {
                    code: code.to_string(),
                    coupon_type: coupon.coupon_type,
                })
            }
        };

        Ok(match coupon.max_discount {
            Some(cap) => amount.min(cap),
            None => amount,
        })
    }
}
