use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;

use roamly_core::coupons::CouponDirectory;
use roamly_core::domain::coupon::Coupon;
use roamly_core::errors::StoreError;

use super::{store_err, RepositoryError};
use crate::DbPool;

/// SQLite-backed coupon lookup. The `code` column collates NOCASE, so the
/// resolver's lowercased codes match rows stored in any casing.
pub struct SqlCouponDirectory {
    pool: DbPool,
}

impl SqlCouponDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Admin write path used by seeding and catalog tooling.
    pub async fn upsert(&self, coupon: &Coupon) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO coupon (code, is_active, coupon_type, value, max_discount, valid_until)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (code) DO UPDATE SET
                is_active = excluded.is_active,
                coupon_type = excluded.coupon_type,
                value = excluded.value,
                max_discount = excluded.max_discount,
                valid_until = excluded.valid_until
            "#,
        )
        .bind(&coupon.code)
        .bind(coupon.is_active)
        .bind(&coupon.coupon_type)
        .bind(coupon.value.to_string())
        .bind(coupon.max_discount.map(|amount| amount.to_string()))
        .bind(coupon.valid_until)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CouponDirectory for SqlCouponDirectory {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT code, is_active, coupon_type, value, max_discount, valid_until
            FROM coupon
            WHERE code = ?
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let stored_code: String = row.try_get("code").map_err(store_err)?;
        let is_active: bool = row.try_get("is_active").map_err(store_err)?;
        let coupon_type: String = row.try_get("coupon_type").map_err(store_err)?;
        let value_text: String = row.try_get("value").map_err(store_err)?;
        let max_discount_text: Option<String> = row.try_get("max_discount").map_err(store_err)?;
        let valid_until: Option<DateTime<Utc>> = row.try_get("valid_until").map_err(store_err)?;

        let value = parse_stored_decimal(&stored_code, "value", &value_text)?;
        let max_discount = max_discount_text
            .map(|text| parse_stored_decimal(&stored_code, "max_discount", &text))
            .transpose()?;

        Ok(Some(Coupon {
            code: stored_code,
            is_active,
            coupon_type,
            value,
            max_discount,
            valid_until,
        }))
    }
}

fn parse_stored_decimal(code: &str, field: &str, text: &str) -> Result<Decimal, StoreError> {
    text.parse::<Decimal>().map_err(|error| {
        StoreError::backend(format!("coupon `{code}` column `{field}` held `{text}`: {error}"))
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use roamly_core::coupons::CouponDirectory;
    use roamly_core::domain::coupon::Coupon;

    use super::SqlCouponDirectory;
    use crate::connect_with_settings;
    use crate::migrations::run_pending;

    fn welcome20() -> Coupon {
        Coupon {
            code: "WELCOME20".to_string(),
            is_active: true,
            coupon_type: "percentage".to_string(),
            value: Decimal::from(20),
            max_discount: Some(Decimal::from(5)),
            valid_until: Some(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn lookup_matches_codes_case_insensitively() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        let directory = SqlCouponDirectory::new(pool);

        directory.upsert(&welcome20()).await.expect("upsert");

        let found = directory.find_by_code("welcome20").await.expect("lookup");

        assert_eq!(found, Some(welcome20()));
    }

    #[tokio::test]
    async fn unknown_codes_return_none() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        let directory = SqlCouponDirectory::new(pool);

        let found = directory.find_by_code("ghost").await.expect("lookup");

        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn upsert_refreshes_an_existing_code() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        let directory = SqlCouponDirectory::new(pool);

        directory.upsert(&welcome20()).await.expect("insert");
        let mut expired = welcome20();
        expired.is_active = false;
        expired.max_discount = None;
        directory.upsert(&expired).await.expect("update");

        let found = directory.find_by_code("WELCOME20").await.expect("lookup");

        assert_eq!(found, Some(expired));
    }
}
