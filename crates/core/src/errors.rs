use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("no bundle available for the requested coverage")]
    NoBundleAvailable,
}

impl PricingError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::NoBundleAvailable => "no_bundle_available",
        }
    }
}

/// Failure of a session store or coupon directory backend.
///
/// Storage crates map their native errors into this before the checkout
/// logic sees them.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage backend failure: {reason}")]
    Backend { reason: String },
}

impl StoreError {
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

/// Rejections of a coupon redemption.
///
/// Every variant except `Store` carries a message safe to surface verbatim
/// in the checkout UI.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    #[error("checkout session `{session_id}` was not found")]
    SessionNotFound { session_id: String },
    #[error("coupon code `{code}` is not recognized")]
    InvalidCoupon { code: String },
    #[error("coupon code `{code}` is no longer active")]
    CouponInactive { code: String },
    #[error("coupon code `{code}` expired at {expired_at}")]
    CouponExpired {
        code: String,
        expired_at: DateTime<Utc>,
    },
    #[error("coupon code `{code}` has unsupported type `{coupon_type}`")]
    UnsupportedCouponType { code: String, coupon_type: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CouponError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::SessionNotFound { .. } => "session_not_found",
            Self::InvalidCoupon { .. } => "invalid_coupon",
            Self::CouponInactive { .. } => "coupon_inactive",
            Self::CouponExpired { .. } => "coupon_expired",
            Self::UnsupportedCouponType { .. } => "unsupported_coupon_type",
            Self::Store(_) => "store_unavailable",
        }
    }
}
