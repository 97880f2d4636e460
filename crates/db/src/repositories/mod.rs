use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use roamly_core::domain::bundle::Bundle;
use roamly_core::domain::rule::PricingRule;
use roamly_core::errors::StoreError;
use roamly_core::pricing::{MarkupRule, MarkupTable};

pub mod catalog;
pub mod coupon;
pub mod markup;
pub mod memory;
pub mod rules;
pub mod session;

pub use catalog::SqlCatalogRepository;
pub use coupon::SqlCouponDirectory;
pub use markup::SqlMarkupRepository;
pub use memory::{InMemoryCouponDirectory, InMemorySessionStore};
pub use rules::SqlRuleRepository;
pub use session::SqlSessionStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read side of the synced provider catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_for_provider(&self, provider_id: &str) -> Result<Vec<Bundle>, RepositoryError>;
    async fn save(&self, provider_id: &str, bundle: &Bundle) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait MarkupRepository: Send + Sync {
    async fn table_for(
        &self,
        provider_id: &str,
        plan_type: &str,
    ) -> Result<MarkupTable, RepositoryError>;
    async fn save(&self, rule: &MarkupRule) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait RuleRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<PricingRule>, RepositoryError>;
    async fn save(&self, rule: &PricingRule) -> Result<(), RepositoryError>;
}

/// Maps storage failures onto the engine-facing error the resolver expects.
pub(crate) fn store_err(error: sqlx::Error) -> StoreError {
    StoreError::backend(error.to_string())
}

pub(crate) fn parse_decimal(field: &str, text: &str) -> Result<Decimal, RepositoryError> {
    text.parse::<Decimal>().map_err(|error| {
        RepositoryError::Decode(format!("column `{field}` held non-decimal text `{text}`: {error}"))
    })
}
