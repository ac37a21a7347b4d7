//! Ordered schema-variant lookup over parsed payloads.
//!
//! Each logical attribute lists the paths where known model families put it.
//! Paths are tried strictly in declared order and the first one that yields a
//! usable value wins, whichever provider produced the payload. Counts that have
//! no explicit field fall back to text paths and a length-based approximation.

use crate::core::constants::CHARS_PER_TOKEN;

use super::error::ExtractError;
use super::payload::ValueTree;
use super::serialize::{coerce_count, coerce_probability, render_tree};
use super::sink::AttributeValue;

/// Ordered pointer-style paths for one logical attribute.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePathList<'p> {
    paths: &'p [&'p str],
}

impl<'p> CandidatePathList<'p> {
    pub const fn new(paths: &'p [&'p str]) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &'p [&'p str] {
        self.paths
    }

    /// First candidate that reaches a non-null, valid node.
    pub fn resolve<'t>(&self, tree: &'t ValueTree) -> Option<&'t ValueTree> {
        self.first_match(tree, |node| match node {
            ValueTree::Null => Err(ExtractError::miss("", "null value")),
            ValueTree::Rejected(literal) => Err(ExtractError::OutOfRangeNumeric {
                literal: literal.clone(),
            }),
            _ => Ok(node),
        })
    }

    /// First candidate whose node `accept` takes. A rejected node moves on to the next candidate.
    pub fn first_match<'t, T>(
        &self,
        tree: &'t ValueTree,
        accept: impl Fn(&'t ValueTree) -> Result<T, ExtractError>,
    ) -> Option<T> {
        self.paths.iter().find_map(|path| {
            let Some(node) = tree.pointer(path) else {
                tracing::trace!(path, "Candidate path missing");
                return None;
            };
            match accept(node) {
                Ok(value) => Some(value),
                Err(error) => {
                    tracing::trace!(path, %error, "Candidate rejected");
                    None
                }
            }
        })
    }
}

/// Target representation of a payload-derived attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    /// Single value rendered as a one-element sequence, `[value]`.
    Sequence,
    Count,
    Probability,
}

/// A logical attribute read from a payload.
#[derive(Debug, Clone, Copy)]
pub struct BodyAttribute {
    pub key: &'static str,
    pub kind: ValueKind,
    pub candidates: CandidatePathList<'static>,
    /// Text paths used to approximate a count when no candidate matches.
    pub text_fallback: Option<CandidatePathList<'static>>,
}

impl BodyAttribute {
    pub const fn new(key: &'static str, kind: ValueKind, paths: &'static [&'static str]) -> Self {
        Self {
            key,
            kind,
            candidates: CandidatePathList::new(paths),
            text_fallback: None,
        }
    }

    pub const fn with_text_fallback(mut self, paths: &'static [&'static str]) -> Self {
        self.text_fallback = Some(CandidatePathList::new(paths));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    Direct,
    Approximated,
}

/// Transient result of resolving one attribute; emitted then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAttribute {
    pub key: &'static str,
    pub value: AttributeValue,
    pub derivation: Derivation,
}

/// Resolve `attr` against a parsed payload.
pub fn resolve_body(attr: &BodyAttribute, tree: &ValueTree) -> Option<ResolvedAttribute> {
    let direct = |value: AttributeValue| ResolvedAttribute {
        key: attr.key,
        value,
        derivation: Derivation::Direct,
    };

    match attr.kind {
        ValueKind::Text => attr
            .candidates
            .first_match(tree, rendered)
            .map(|s| direct(AttributeValue::Str(s))),
        ValueKind::Sequence => attr
            .candidates
            .first_match(tree, rendered)
            .map(|s| direct(AttributeValue::Str(format!("[{s}]")))),
        ValueKind::Probability => attr
            .candidates
            .first_match(tree, coerce_probability)
            .map(|v| direct(AttributeValue::Float(v))),
        ValueKind::Count => {
            if let Some(count) = attr.candidates.first_match(tree, coerce_count) {
                return Some(direct(AttributeValue::Int(count)));
            }
            let fallback = attr.text_fallback?;
            fallback
                .first_match(tree, |node| {
                    node.as_str().map(approximate_count).ok_or(ExtractError::TypeMismatch {
                        expected: "string",
                        found: node.kind(),
                    })
                })
                .map(|count| ResolvedAttribute {
                    key: attr.key,
                    value: AttributeValue::Int(count),
                    derivation: Derivation::Approximated,
                })
        }
    }
}

fn rendered(node: &ValueTree) -> Result<String, ExtractError> {
    render_tree(node).ok_or(ExtractError::TypeMismatch {
        expected: "non-empty value",
        found: node.kind(),
    })
}

/// `ceil(chars / 6)`, counting Unicode scalar values.
pub fn approximate_count(text: &str) -> i64 {
    (text.chars().count() as f64 / CHARS_PER_TOKEN).ceil() as i64
}

#[cfg(test)]
#[path = "candidates_tests.rs"]
mod tests;
