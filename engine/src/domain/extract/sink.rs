//! Destinations for extracted attributes.

use std::collections::BTreeMap;

use opentelemetry::KeyValue;
use opentelemetry::trace::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Str(s) => write!(f, "{}", s),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Typed attribute writer supplied by the caller.
pub trait AttributeSink {
    fn put_str(&mut self, key: &'static str, value: String);
    fn put_i64(&mut self, key: &'static str, value: i64);
    fn put_f64(&mut self, key: &'static str, value: f64);

    fn put(&mut self, key: &'static str, value: AttributeValue) {
        match value {
            AttributeValue::Str(s) => self.put_str(key, s),
            AttributeValue::Int(i) => self.put_i64(key, i),
            AttributeValue::Float(v) => self.put_f64(key, v),
        }
    }
}

/// In-memory sink. A later write to the same key replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedAttributes {
    values: BTreeMap<&'static str, AttributeValue>,
}

impl RecordedAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.values.get(key)? {
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl AttributeSink for RecordedAttributes {
    fn put_str(&mut self, key: &'static str, value: String) {
        self.values.insert(key, AttributeValue::Str(value));
    }

    fn put_i64(&mut self, key: &'static str, value: i64) {
        self.values.insert(key, AttributeValue::Int(value));
    }

    fn put_f64(&mut self, key: &'static str, value: f64) {
        self.values.insert(key, AttributeValue::Float(value));
    }
}

impl AttributeSink for Vec<KeyValue> {
    fn put_str(&mut self, key: &'static str, value: String) {
        self.push(KeyValue::new(key, value));
    }

    fn put_i64(&mut self, key: &'static str, value: i64) {
        self.push(KeyValue::new(key, value));
    }

    fn put_f64(&mut self, key: &'static str, value: f64) {
        self.push(KeyValue::new(key, value));
    }
}

/// Writes attributes straight onto an OpenTelemetry span.
pub struct SpanSink<'s, S: Span> {
    span: &'s mut S,
}

impl<'s, S: Span> SpanSink<'s, S> {
    pub fn new(span: &'s mut S) -> Self {
        Self { span }
    }
}

impl<S: Span> AttributeSink for SpanSink<'_, S> {
    fn put_str(&mut self, key: &'static str, value: String) {
        self.span.set_attribute(KeyValue::new(key, value));
    }

    fn put_i64(&mut self, key: &'static str, value: i64) {
        self.span.set_attribute(KeyValue::new(key, value));
    }

    fn put_f64(&mut self, key: &'static str, value: f64) {
        self.span.set_attribute(KeyValue::new(key, value));
    }
}
