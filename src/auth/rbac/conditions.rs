//! Condition validation and evaluation
//!
//! A condition whose value has the wrong shape for its operator is a
//! configuration error, never a silent deny. A missing context field makes the
//! condition unmet.

use super::types::{Condition, ConditionOperator};
use crate::utils::error::{CoreError, Result};
use crate::utils::json::lookup_path;
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;

fn malformed(condition: &Condition, expected: &str) -> CoreError {
    CoreError::invalid_config(format!(
        "operator '{}' on field '{}' requires {}, got {}",
        condition.operator, condition.field, expected, condition.value
    ))
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn is_comparable(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_))
}

/// Check that the operator and value agree
pub fn validate_condition(condition: &Condition) -> Result<()> {
    if condition.field.trim().is_empty() {
        return Err(CoreError::invalid_config("condition field cannot be empty"));
    }

    let value = &condition.value;
    match condition.operator {
        ConditionOperator::Eq | ConditionOperator::Neq => Ok(()),
        ConditionOperator::Gt
        | ConditionOperator::Gte
        | ConditionOperator::Lt
        | ConditionOperator::Lte => {
            if is_comparable(value) {
                Ok(())
            } else {
                Err(malformed(condition, "a number or string"))
            }
        }
        ConditionOperator::In | ConditionOperator::NotIn => {
            if value.is_array() {
                Ok(())
            } else {
                Err(malformed(condition, "an array"))
            }
        }
        ConditionOperator::Contains => {
            if is_scalar(value) {
                Ok(())
            } else {
                Err(malformed(condition, "a scalar"))
            }
        }
        ConditionOperator::StartsWith | ConditionOperator::EndsWith | ConditionOperator::Like => {
            if value.is_string() {
                Ok(())
            } else {
                Err(malformed(condition, "a string"))
            }
        }
        ConditionOperator::Between => match value.as_array().map(Vec::as_slice) {
            Some([low, high])
                if (low.is_number() && high.is_number())
                    || (low.is_string() && high.is_string()) =>
            {
                Ok(())
            }
            _ => Err(malformed(condition, "a [low, high] pair of the same type")),
        },
        ConditionOperator::Regex => match value.as_str() {
            Some(pattern) => Regex::new(pattern).map(|_| ()).map_err(|e| {
                CoreError::invalid_config(format!(
                    "invalid regex on field '{}': {}",
                    condition.field, e
                ))
            }),
            None => Err(malformed(condition, "a regex string")),
        },
    }
}

/// Evaluate one condition against the context projection
pub fn evaluate_condition(condition: &Condition, context: &Value) -> Result<bool> {
    validate_condition(condition)?;

    let Some(actual) = lookup_path(context, &condition.field).filter(|v| !v.is_null()) else {
        return Ok(false);
    };
    let expected = &condition.value;

    let result = match condition.operator {
        ConditionOperator::Eq => values_equal(actual, expected),
        ConditionOperator::Neq => !values_equal(actual, expected),
        ConditionOperator::Gt => compare(actual, expected) == Some(Ordering::Greater),
        ConditionOperator::Gte => matches!(
            compare(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        ConditionOperator::Lt => compare(actual, expected) == Some(Ordering::Less),
        ConditionOperator::Lte => matches!(
            compare(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        ConditionOperator::In => any_in(actual, expected),
        ConditionOperator::NotIn => !any_in(actual, expected),
        ConditionOperator::Contains => match actual {
            Value::String(s) => expected.as_str().is_some_and(|e| s.contains(e)),
            Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
            _ => false,
        },
        ConditionOperator::StartsWith => match (actual.as_str(), expected.as_str()) {
            (Some(a), Some(e)) => a.starts_with(e),
            _ => false,
        },
        ConditionOperator::EndsWith => match (actual.as_str(), expected.as_str()) {
            (Some(a), Some(e)) => a.ends_with(e),
            _ => false,
        },
        ConditionOperator::Between => match expected.as_array().map(Vec::as_slice) {
            Some([low, high]) => {
                matches!(
                    compare(actual, low),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(compare(actual, high), Some(Ordering::Less | Ordering::Equal))
            }
            _ => false,
        },
        ConditionOperator::Regex => match (actual.as_str(), expected.as_str()) {
            (Some(a), Some(pattern)) => Regex::new(pattern)
                .map_err(|e| CoreError::invalid_config(format!("invalid regex: {}", e)))?
                .is_match(a),
            _ => false,
        },
        ConditionOperator::Like => match (actual.as_str(), expected.as_str()) {
            (Some(a), Some(pattern)) => like_regex(pattern)?.is_match(a),
            _ => false,
        },
    };

    Ok(result)
}

/// Evaluate every condition; all must hold
pub fn evaluate_all(conditions: &[Condition], context: &Value) -> Result<bool> {
    for condition in conditions {
        if !evaluate_condition(condition, context)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn any_in(actual: &Value, expected: &Value) -> bool {
    let Some(options) = expected.as_array() else {
        return false;
    };
    match actual {
        Value::Array(items) => items
            .iter()
            .any(|item| options.iter().any(|o| values_equal(item, o))),
        scalar => options.iter().any(|o| values_equal(scalar, o)),
    }
}

/// SQL LIKE: `%` any run, `_` one character, case-insensitive
fn like_regex(pattern: &str) -> Result<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push_str("(?is)^");
    for ch in pattern.chars() {
        match ch {
            '%' => expr.push_str(".*"),
            '_' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|e| CoreError::invalid_config(format!("invalid like pattern: {}", e)))
}
