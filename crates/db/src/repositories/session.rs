use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use roamly_core::coupons::SessionStore;
use roamly_core::domain::breakdown::PricingBreakdown;
use roamly_core::domain::session::{CheckoutSession, SessionId, SessionMetadata};
use roamly_core::errors::StoreError;

use super::store_err;
use crate::DbPool;

/// SQLite-backed checkout session store.
///
/// The full pricing breakdown persists as one JSON document; coupon
/// resolution rewrites it wholesale, so there is nothing to gain from
/// normalizing the money fields into columns.
pub struct SqlSessionStore {
    pool: DbPool,
}

impl SqlSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SqlSessionStore {
    async fn find(&self, id: &SessionId) -> Result<Option<CheckoutSession>, StoreError> {
        let row = sqlx::query(
            "SELECT id, pricing_json, metadata_json, updated_at FROM checkout_session WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let stored_id: String = row.try_get("id").map_err(store_err)?;
        let pricing_json: String = row.try_get("pricing_json").map_err(store_err)?;
        let metadata_json: String = row.try_get("metadata_json").map_err(store_err)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(store_err)?;

        let pricing: PricingBreakdown = serde_json::from_str(&pricing_json).map_err(|error| {
            StoreError::backend(format!("session `{stored_id}` pricing_json did not parse: {error}"))
        })?;
        let metadata: SessionMetadata = serde_json::from_str(&metadata_json).map_err(|error| {
            StoreError::backend(format!(
                "session `{stored_id}` metadata_json did not parse: {error}"
            ))
        })?;

        Ok(Some(CheckoutSession { id: SessionId(stored_id), pricing, metadata, updated_at }))
    }

    async fn save(&self, session: &CheckoutSession) -> Result<(), StoreError> {
        let pricing_json = serde_json::to_string(&session.pricing)
            .map_err(|error| StoreError::backend(error.to_string()))?;
        let metadata_json = serde_json::to_string(&session.metadata)
            .map_err(|error| StoreError::backend(error.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO checkout_session (id, pricing_json, metadata_json, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                pricing_json = excluded.pricing_json,
                metadata_json = excluded.metadata_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&session.id.0)
        .bind(pricing_json)
        .bind(metadata_json)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }
}
