use serde_json::Value;

use crate::domain::rule::{Condition, ConditionOperator};

/// Evaluates one condition against the pricing context document.
///
/// Total over arbitrary input: a missing field, a malformed value, or an
/// unknown operator makes the condition false, never an error.
pub fn evaluate(condition: &Condition, context: &Value) -> bool {
    let field = resolve_path(context, &condition.field);

    match condition.operator {
        ConditionOperator::Equals => loose_eq(field, &condition.value),
        ConditionOperator::NotEquals => !loose_eq(field, &condition.value),
        ConditionOperator::In => {
            let Value::Array(options) = &condition.value else {
                return false;
            };
            field.is_some_and(|actual| options.contains(actual))
        }
        ConditionOperator::NotIn => {
            let Value::Array(options) = &condition.value else {
                return false;
            };
            !field.is_some_and(|actual| options.contains(actual))
        }
        ConditionOperator::Contains => match field {
            Some(Value::String(haystack)) => condition
                .value
                .as_str()
                .is_some_and(|needle| haystack.contains(needle)),
            Some(Value::Array(items)) => items.contains(&condition.value),
            _ => false,
        },
        ConditionOperator::GreaterThan => ordered(field, &condition.value, |a, b| a > b),
        ConditionOperator::LessThan => ordered(field, &condition.value, |a, b| a < b),
        ConditionOperator::GreaterThanOrEqual => ordered(field, &condition.value, |a, b| a >= b),
        ConditionOperator::LessThanOrEqual => ordered(field, &condition.value, |a, b| a <= b),
        ConditionOperator::Between => {
            let Value::Array(bounds) = &condition.value else {
                return false;
            };
            let [low, high] = bounds.as_slice() else {
                return false;
            };
            match (field.and_then(as_number), as_number(low), as_number(high)) {
                (Some(value), Some(low), Some(high)) => value >= low && value <= high,
                _ => false,
            }
        }
        ConditionOperator::Exists => field.is_some_and(|value| !value.is_null()),
        ConditionOperator::NotExists => field.map_or(true, Value::is_null),
        ConditionOperator::Unknown => false,
    }
}

/// True when every condition matches. An empty list always matches.
pub fn evaluate_all(conditions: &[Condition], context: &Value) -> bool {
    conditions
        .iter()
        .all(|condition| evaluate(condition, context))
}

/// Walks a dot path (`request.paymentMethod`) through nested objects.
fn resolve_path<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = context;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Equality with numeric coercion: `"123"` equals `123`. Everything else
/// compares strictly. A missing field equals nothing.
fn loose_eq(actual: Option<&Value>, expected: &Value) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    if let (Some(left), Some(right)) = (as_number(actual), as_number(expected)) {
        return left == right;
    }
    actual == expected
}

fn ordered(actual: Option<&Value>, expected: &Value, check: fn(f64, f64) -> bool) -> bool {
    match (actual.and_then(as_number), as_number(expected)) {
        (Some(left), Some(right)) => check(left, right),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}
