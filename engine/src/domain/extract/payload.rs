//! Parser for serialized request/response bodies.
//!
//! Documents are parsed with `serde_json` and folded into a [`ValueTree`]. A
//! number literal with a fraction or exponent is a bounded fraction and must
//! lie in `[0.0, 1.0]`. A literal outside that range does not fail the
//! document; it becomes [`ValueTree::Rejected`] so every other value stays
//! reachable. Integral literals are unrestricted up to `i64`. Nesting is
//! capped by `serde_json`'s recursion limit.

use std::collections::HashMap;

use super::error::PayloadError;

#[derive(Debug, Clone, PartialEq)]
pub enum ValueTree {
    /// Duplicate keys: the last occurrence wins.
    Object(HashMap<String, ValueTree>),
    Array(Vec<ValueTree>),
    String(String),
    Number(Number),
    Bool(bool),
    Null,
    /// A numeric literal that failed validation, kept in textual form.
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    /// Always within `[0.0, 1.0]`.
    Fraction(f64),
}

impl ValueTree {
    pub fn get(&self, key: &str) -> Option<&ValueTree> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Follow a pointer-style path (`/usage/0/tokens`). Empty segments are skipped,
    /// so `/a/b`, `a/b` and `/a//b` address the same node.
    pub fn pointer(&self, path: &str) -> Option<&ValueTree> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| match node {
                Self::Object(map) => map.get(segment),
                Self::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::String(_) => "string",
            Self::Number(Number::Integer(_)) => "integer",
            Self::Number(Number::Fraction(_)) => "fraction",
            Self::Bool(_) => "boolean",
            Self::Null => "null",
            Self::Rejected(_) => "rejected number",
        }
    }
}

impl From<&ValueTree> for serde_json::Value {
    fn from(tree: &ValueTree) -> Self {
        match tree {
            ValueTree::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
            ValueTree::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            ValueTree::String(s) => serde_json::Value::String(s.clone()),
            ValueTree::Number(Number::Integer(i)) => serde_json::Value::from(*i),
            ValueTree::Number(Number::Fraction(f)) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ValueTree::Bool(b) => serde_json::Value::Bool(*b),
            ValueTree::Null | ValueTree::Rejected(_) => serde_json::Value::Null,
        }
    }
}

impl From<serde_json::Value> for ValueTree {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, ValueTree::from(v)))
                    .collect(),
            ),
            Value::Array(items) => Self::Array(items.into_iter().map(ValueTree::from).collect()),
            Value::String(s) => Self::String(s),
            Value::Number(n) => number(&n),
            Value::Bool(b) => Self::Bool(b),
            Value::Null => Self::Null,
        }
    }
}

/// Apply the numeric rules: fractional literals must lie in `[0.0, 1.0]`,
/// integral literals must fit in `i64`.
fn number(n: &serde_json::Number) -> ValueTree {
    if n.is_f64() {
        return match n.as_f64() {
            Some(v) if v.is_finite() && (0.0..=1.0).contains(&v) => {
                ValueTree::Number(Number::Fraction(v))
            }
            _ => ValueTree::Rejected(n.to_string()),
        };
    }
    match n.as_i64() {
        Some(i) => ValueTree::Number(Number::Integer(i)),
        None => ValueTree::Rejected(n.to_string()),
    }
}

/// Parse a UTF-8 payload into a [`ValueTree`].
pub fn parse(bytes: &[u8]) -> Result<ValueTree, PayloadError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    Ok(ValueTree::from(value))
}

pub fn parse_str(text: &str) -> Result<ValueTree, PayloadError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Ok(ValueTree::from(value))
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
