use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pipeline phase a pricing rule belongs to.
///
/// Phases always run in the order below; rule priority only orders rules
/// inside the same phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleCategory {
    BundleAdjustment,
    Discount,
    Constraint,
    Fee,
}

impl RuleCategory {
    /// Leading sort key of the rule pipeline.
    pub fn rank(self) -> u8 {
        match self {
            Self::BundleAdjustment => 0,
            Self::Discount => 1,
            Self::Constraint => 2,
            Self::Fee => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BundleAdjustment => "BUNDLE_ADJUSTMENT",
            Self::Discount => "DISCOUNT",
            Self::Constraint => "CONSTRAINT",
            Self::Fee => "FEE",
        }
    }
}

/// Comparison operator of a rule condition.
///
/// Operators arrive as free-form strings from the rule store. Anything not
/// recognized becomes `Unknown`, which never matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Contains,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Between,
    Exists,
    NotExists,
    Unknown,
}

impl ConditionOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "Equals",
            Self::NotEquals => "NotEquals",
            Self::In => "In",
            Self::NotIn => "NotIn",
            Self::Contains => "Contains",
            Self::GreaterThan => "GreaterThan",
            Self::LessThan => "LessThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::Between => "Between",
            Self::Exists => "Exists",
            Self::NotExists => "NotExists",
            Self::Unknown => "Unknown",
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "Equals" => Self::Equals,
            "NotEquals" => Self::NotEquals,
            "In" => Self::In,
            "NotIn" => Self::NotIn,
            "Contains" => Self::Contains,
            "GreaterThan" => Self::GreaterThan,
            "LessThan" => Self::LessThan,
            "GreaterThanOrEqual" => Self::GreaterThanOrEqual,
            "LessThanOrEqual" => Self::LessThanOrEqual,
            "Between" => Self::Between,
            "Exists" => Self::Exists,
            "NotExists" => Self::NotExists,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for ConditionOperator {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ConditionOperator> for String {
    fn from(value: ConditionOperator) -> Self {
        value.as_str().to_string()
    }
}

/// A single predicate over the pricing context document.
///
/// `field` is a dot path such as `request.paymentMethod`. `value` may stay
/// null for operators that do not need one (`Exists`, `NotExists`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}

/// Price mutation performed by a matched rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Action {
    /// Adds a flat amount to the running price.
    AddMarkup(Decimal),
    /// Subtracts a percentage of the running price.
    ApplyDiscountPercentage(Decimal),
    /// Sets the payment processing rate (percent of final price).
    SetProcessingRate(Decimal),
    /// Raises the price until net profit reaches the given floor.
    SetMinimumProfit(Decimal),
    /// Raises the price to the given floor if it fell below.
    SetMinimumPrice(Decimal),
}

/// An admin-authored pricing rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRule {
    pub name: String,
    pub category: RuleCategory,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub priority: i32,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ranks_follow_pipeline_order() {
        assert!(RuleCategory::BundleAdjustment.rank() < RuleCategory::Discount.rank());
        assert!(RuleCategory::Discount.rank() < RuleCategory::Constraint.rank());
        assert!(RuleCategory::Constraint.rank() < RuleCategory::Fee.rank());
    }

    #[test]
    fn category_uses_screaming_snake_on_the_wire() {
        let encoded = serde_json::to_string(&RuleCategory::BundleAdjustment).unwrap();
        assert_eq!(encoded, "\"BUNDLE_ADJUSTMENT\"");

        let decoded: RuleCategory = serde_json::from_str("\"DISCOUNT\"").unwrap();
        assert_eq!(decoded, RuleCategory::Discount);
    }

    #[test]
    fn unrecognized_operator_becomes_unknown() {
        let decoded: ConditionOperator = serde_json::from_str("\"Regex\"").unwrap();
        assert_eq!(decoded, ConditionOperator::Unknown);

        let known: ConditionOperator = serde_json::from_str("\"GreaterThanOrEqual\"").unwrap();
        assert_eq!(known, ConditionOperator::GreaterThanOrEqual);
    }

    #[test]
    fn actions_are_tagged_by_type_and_value() {
        let decoded: Action = serde_json::from_value(serde_json::json!({
            "type": "ApplyDiscountPercentage",
            "value": "12.5",
        }))
        .unwrap();

        assert_eq!(decoded, Action::ApplyDiscountPercentage(Decimal::new(125, 1)));
    }

    #[test]
    fn rule_conditions_default_to_empty() {
        let decoded: PricingRule = serde_json::from_value(serde_json::json!({
            "name": "visa-fee",
            "category": "FEE",
            "actions": [{"type": "SetProcessingRate", "value": "2.9"}],
            "isActive": true,
        }))
        .unwrap();

        assert!(decoded.conditions.is_empty());
        assert_eq!(decoded.priority, 0);
    }
}
