//! Rendering of resolved values into attribute representations.
//!
//! Sequences and mappings render as `[a,b]`, nested reflected objects as a
//! compact JSON object of their accessor values, scalars in their natural
//! textual form. Typed coercions return an error instead of a value when the
//! input fails the type's rule; callers fold that into "no value".

use crate::core::constants::MAX_RENDER_DEPTH;
use crate::domain::reflect::{FieldValue, Reflect};

use super::error::ExtractError;
use super::payload::{Number, ValueTree};

/// Render a traversed field value. `None` for empty strings, empty sequences,
/// empty objects and non-UTF-8 bytes.
pub fn serialize(value: &FieldValue<'_>) -> Option<String> {
    match value {
        FieldValue::Str(s) => non_empty(s.to_string()),
        FieldValue::Int(i) => Some(i.to_string()),
        FieldValue::Float(f) => Some(f.to_string()),
        FieldValue::Bool(b) => Some(b.to_string()),
        FieldValue::Bytes(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| non_empty(s.to_string())),
        FieldValue::List(items) => bracketed(items.iter().filter_map(serialize)),
        FieldValue::Map(keys) => bracketed(keys.iter().map(|k| k.to_string())),
        FieldValue::Object(obj) => object_to_json(*obj, 0)
            .filter(|map| !map.is_empty())
            .and_then(|map| serde_json::to_string(&map).ok()),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn bracketed(items: impl Iterator<Item = String>) -> Option<String> {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        None
    } else {
        Some(format!("[{}]", items.join(",")))
    }
}

/// JSON form of a field value, following nested objects up to a fixed depth.
pub fn to_json(value: &FieldValue<'_>) -> Option<serde_json::Value> {
    value_to_json(value, 0)
}

fn value_to_json(value: &FieldValue<'_>, depth: usize) -> Option<serde_json::Value> {
    use serde_json::Value;

    match value {
        FieldValue::Str(s) => Some(Value::String(s.to_string())),
        FieldValue::Int(i) => Some(Value::from(*i)),
        FieldValue::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
        FieldValue::Bool(b) => Some(Value::Bool(*b)),
        FieldValue::Bytes(bytes) => std::str::from_utf8(bytes)
            .ok()
            .map(|s| Value::String(s.to_string())),
        FieldValue::List(items) => Some(Value::Array(
            items
                .iter()
                .filter_map(|item| value_to_json(item, depth))
                .collect(),
        )),
        FieldValue::Map(keys) => Some(Value::Array(
            keys.iter().map(|k| Value::String(k.to_string())).collect(),
        )),
        FieldValue::Object(obj) => object_to_json(*obj, depth).map(Value::Object),
    }
}

fn object_to_json(
    obj: &dyn Reflect,
    depth: usize,
) -> Option<serde_json::Map<String, serde_json::Value>> {
    if depth >= MAX_RENDER_DEPTH {
        tracing::trace!(type_name = obj.type_name(), "Render depth exceeded");
        return None;
    }
    let map = obj
        .accessors()
        .iter()
        .enumerate()
        .filter_map(|(slot, name)| {
            let value = obj.invoke(slot)?;
            let json = value_to_json(&value, depth + 1)?;
            Some((name.to_string(), json))
        })
        .collect();
    Some(map)
}

/// Natural text of a payload node. Containers render as compact JSON.
pub fn render_tree(tree: &ValueTree) -> Option<String> {
    match tree {
        ValueTree::String(s) => non_empty(s.clone()),
        ValueTree::Number(Number::Integer(i)) => Some(i.to_string()),
        ValueTree::Number(Number::Fraction(f)) => Some(f.to_string()),
        ValueTree::Bool(b) => Some(b.to_string()),
        ValueTree::Null | ValueTree::Rejected(_) => None,
        ValueTree::Object(_) | ValueTree::Array(_) => {
            Some(serde_json::Value::from(tree).to_string())
        }
    }
}

/// Probability-like value in `[0.0, 1.0]`.
pub fn coerce_probability(tree: &ValueTree) -> Result<f64, ExtractError> {
    match tree {
        ValueTree::Number(Number::Fraction(f)) => Ok(*f),
        ValueTree::Number(Number::Integer(i @ (0 | 1))) => Ok(*i as f64),
        ValueTree::Number(Number::Integer(i)) => Err(ExtractError::OutOfRangeNumeric {
            literal: i.to_string(),
        }),
        ValueTree::Rejected(literal) => Err(ExtractError::OutOfRangeNumeric {
            literal: literal.clone(),
        }),
        ValueTree::String(s) => {
            parse_probability(s).ok_or_else(|| ExtractError::OutOfRangeNumeric {
                literal: s.clone(),
            })
        }
        other => Err(ExtractError::TypeMismatch {
            expected: "probability",
            found: other.kind(),
        }),
    }
}

/// Integral count. Fractions are not counts.
pub fn coerce_count(tree: &ValueTree) -> Result<i64, ExtractError> {
    match tree {
        ValueTree::Number(Number::Integer(i)) => Ok(*i),
        ValueTree::Rejected(literal) => Err(ExtractError::OutOfRangeNumeric {
            literal: literal.clone(),
        }),
        ValueTree::String(s) => parse_count(s).ok_or(ExtractError::TypeMismatch {
            expected: "integer",
            found: "string",
        }),
        other => Err(ExtractError::TypeMismatch {
            expected: "integer",
            found: other.kind(),
        }),
    }
}

pub fn parse_probability(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
}

pub fn parse_count(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}
