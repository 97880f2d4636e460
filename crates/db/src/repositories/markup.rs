use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use roamly_core::pricing::{MarkupRule, MarkupTable};

use super::{parse_decimal, MarkupRepository, RepositoryError};
use crate::DbPool;

/// SQLite-backed wholesale markup configuration.
pub struct SqlMarkupRepository {
    pool: DbPool,
}

impl SqlMarkupRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn rule_from_row(row: &SqliteRow) -> Result<MarkupRule, RepositoryError> {
        let provider_id: String = row.try_get("provider_id")?;
        let plan_type: String = row.try_get("plan_type")?;
        let duration_raw: i64 = row.try_get("duration_days")?;
        let markup_text: String = row.try_get("markup")?;

        let duration_days = u32::try_from(duration_raw).map_err(|_| {
            RepositoryError::Decode(format!(
                "markup for `{provider_id}/{plan_type}` has duration `{duration_raw}` outside u32"
            ))
        })?;

        Ok(MarkupRule {
            provider_id,
            plan_type,
            duration_days,
            markup: parse_decimal("markup", &markup_text)?,
        })
    }
}

#[async_trait]
impl MarkupRepository for SqlMarkupRepository {
    async fn table_for(
        &self,
        provider_id: &str,
        plan_type: &str,
    ) -> Result<MarkupTable, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT provider_id, plan_type, duration_days, markup
            FROM markup_rule
            WHERE provider_id = ? AND plan_type = ?
            ORDER BY duration_days ASC
            "#,
        )
        .bind(provider_id)
        .bind(plan_type)
        .fetch_all(&self.pool)
        .await?;

        let rules = rows.iter().map(Self::rule_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(MarkupTable::new(rules))
    }

    async fn save(&self, rule: &MarkupRule) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO markup_rule (provider_id, plan_type, duration_days, markup)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (provider_id, plan_type, duration_days) DO UPDATE SET
                markup = excluded.markup
            "#,
        )
        .bind(&rule.provider_id)
        .bind(&rule.plan_type)
        .bind(i64::from(rule.duration_days))
        .bind(rule.markup.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
