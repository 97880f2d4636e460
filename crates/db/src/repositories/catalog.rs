use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row};

use roamly_core::domain::bundle::{Bundle, BundleId};

use super::{parse_decimal, CatalogRepository, RepositoryError};
use crate::DbPool;

/// SQLite-backed catalog of synced provider bundles.
pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn bundle_from_row(row: &SqliteRow) -> Result<Bundle, RepositoryError> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let groups_json: String = row.try_get("groups_json")?;
        let countries_json: String = row.try_get("countries_json")?;
        let validity_raw: i64 = row.try_get("validity_in_days")?;
        let base_price_text: String = row.try_get("base_price")?;
        let currency: String = row.try_get("currency")?;
        let is_unlimited: bool = row.try_get("is_unlimited")?;
        let data_amount_mb: Option<i64> = row.try_get("data_amount_mb")?;

        let groups: Vec<String> = serde_json::from_str(&groups_json).map_err(|error| {
            RepositoryError::Decode(format!("bundle `{id}` groups_json did not parse: {error}"))
        })?;
        let countries: Vec<String> = serde_json::from_str(&countries_json).map_err(|error| {
            RepositoryError::Decode(format!("bundle `{id}` countries_json did not parse: {error}"))
        })?;
        let validity_in_days = u32::try_from(validity_raw).map_err(|_| {
            RepositoryError::Decode(format!(
                "bundle `{id}` validity_in_days `{validity_raw}` does not fit in u32"
            ))
        })?;

        Ok(Bundle {
            id: BundleId(id),
            name,
            groups,
            countries,
            validity_in_days,
            base_price: parse_decimal("base_price", &base_price_text)?,
            currency,
            is_unlimited,
            data_amount_mb,
        })
    }
}

#[async_trait]
impl CatalogRepository for SqlCatalogRepository {
    async fn list_for_provider(&self, provider_id: &str) -> Result<Vec<Bundle>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, groups_json, countries_json, validity_in_days,
                   base_price, currency, is_unlimited, data_amount_mb
            FROM catalog_bundle
            WHERE provider_id = ?
            ORDER BY validity_in_days ASC, id ASC
            "#,
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::bundle_from_row).collect()
    }

    async fn save(&self, provider_id: &str, bundle: &Bundle) -> Result<(), RepositoryError> {
        let groups_json = serde_json::to_string(&bundle.groups)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        let countries_json = serde_json::to_string(&bundle.countries)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO catalog_bundle (
                id, provider_id, name, groups_json, countries_json,
                validity_in_days, base_price, currency, is_unlimited,
                data_amount_mb, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                provider_id = excluded.provider_id,
                name = excluded.name,
                groups_json = excluded.groups_json,
                countries_json = excluded.countries_json,
                validity_in_days = excluded.validity_in_days,
                base_price = excluded.base_price,
                currency = excluded.currency,
                is_unlimited = excluded.is_unlimited,
                data_amount_mb = excluded.data_amount_mb,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&bundle.id.0)
        .bind(provider_id)
        .bind(&bundle.name)
        .bind(groups_json)
        .bind(countries_json)
        .bind(i64::from(bundle.validity_in_days))
        .bind(bundle.base_price.to_string())
        .bind(&bundle.currency)
        .bind(bundle.is_unlimited)
        .bind(bundle.data_amount_mb)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
