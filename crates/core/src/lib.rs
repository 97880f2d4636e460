pub mod config;
pub mod coupons;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use coupons::{auto_match_codes, CouponDirectory, CouponResolver, SessionStore};
pub use domain::breakdown::{AppliedDiscount, PricingBreakdown, PricingStep};
pub use domain::bundle::{Bundle, BundleId};
pub use domain::coupon::{Coupon, CouponKind};
pub use domain::request::PricingRequest;
pub use domain::rule::{Action, Condition, ConditionOperator, PricingRule, RuleCategory};
pub use domain::session::{CheckoutSession, SessionId, SessionMetadata};
pub use errors::{CouponError, PricingError, StoreError};
pub use pricing::{
    select_bundle, BundleSelection, CatalogShape, DeterministicQuoteEngine, MarkupRule,
    MarkupTable, QuoteEngine, QuoteInput,
};
