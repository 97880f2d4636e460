pub mod breakdown;
pub mod bundle;
pub mod coupon;
pub mod request;
pub mod rule;
pub mod session;
