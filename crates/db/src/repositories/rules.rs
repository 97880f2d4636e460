use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use roamly_core::domain::rule::{Action, Condition, PricingRule, RuleCategory};

use super::{RepositoryError, RuleRepository};
use crate::DbPool;

/// SQLite-backed pricing rule store.
///
/// Conditions and actions persist as JSON columns so operators can edit them
/// without schema changes; rule ordering stays an engine concern.
pub struct SqlRuleRepository {
    pool: DbPool,
}

impl SqlRuleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn rule_from_row(row: &SqliteRow) -> Result<PricingRule, RepositoryError> {
        let name: String = row.try_get("name")?;
        let category_text: String = row.try_get("category")?;
        let conditions_json: String = row.try_get("conditions_json")?;
        let actions_json: String = row.try_get("actions_json")?;
        let priority_raw: i64 = row.try_get("priority")?;
        let is_active: bool = row.try_get("is_active")?;

        let category: RuleCategory =
            serde_json::from_value(serde_json::Value::String(category_text.clone())).map_err(
                |_| {
                    RepositoryError::Decode(format!(
                        "rule `{name}` has unknown category `{category_text}`"
                    ))
                },
            )?;
        let conditions: Vec<Condition> = serde_json::from_str(&conditions_json).map_err(|error| {
            RepositoryError::Decode(format!("rule `{name}` conditions_json did not parse: {error}"))
        })?;
        let actions: Vec<Action> = serde_json::from_str(&actions_json).map_err(|error| {
            RepositoryError::Decode(format!("rule `{name}` actions_json did not parse: {error}"))
        })?;
        let priority = i32::try_from(priority_raw).map_err(|_| {
            RepositoryError::Decode(format!(
                "rule `{name}` priority `{priority_raw}` does not fit in i32"
            ))
        })?;

        Ok(PricingRule { name, category, conditions, actions, priority, is_active })
    }
}

#[async_trait]
impl RuleRepository for SqlRuleRepository {
    async fn list(&self) -> Result<Vec<PricingRule>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT name, category, conditions_json, actions_json, priority, is_active
            FROM pricing_rule
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::rule_from_row).collect()
    }

    async fn save(&self, rule: &PricingRule) -> Result<(), RepositoryError> {
        let category = serde_json::to_value(rule.category)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .ok_or_else(|| {
                RepositoryError::Decode(format!("rule `{}` category did not encode", rule.name))
            })?;
        let conditions_json = serde_json::to_string(&rule.conditions)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        let actions_json = serde_json::to_string(&rule.actions)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO pricing_rule (name, category, conditions_json, actions_json, priority, is_active)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (name) DO UPDATE SET
                category = excluded.category,
                conditions_json = excluded.conditions_json,
                actions_json = excluded.actions_json,
                priority = excluded.priority,
                is_active = excluded.is_active
            "#,
        )
        .bind(&rule.name)
        .bind(category)
        .bind(conditions_json)
        .bind(actions_json)
        .bind(i64::from(rule.priority))
        .bind(rule.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
