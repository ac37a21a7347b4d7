//! Failure taxonomy for a single attribute's resolution.
//!
//! None of these reach the caller of the extractor. They are logged where the
//! attribute is dropped and the rest of the call proceeds.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No accessor for field '{field}' on {type_name}")]
    AccessorNotFound {
        type_name: &'static str,
        field: String,
    },

    #[error("Path miss at '{segment}': {reason}")]
    PathMiss {
        segment: String,
        reason: &'static str,
    },

    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] PayloadError),

    #[error("Numeric value out of range: {literal}")]
    OutOfRangeNumeric { literal: String },

    #[error("Expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Payload of {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },
}

impl ExtractError {
    pub(crate) fn miss(segment: &str, reason: &'static str) -> Self {
        Self::PathMiss {
            segment: segment.to_string(),
            reason,
        }
    }
}

/// Whole-document parse failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Unexpected end of payload at line {line}, column {column}")]
    UnexpectedEnd { line: usize, column: usize },

    #[error("Invalid payload: {0}")]
    Syntax(String),
}

impl From<serde_json::Error> for PayloadError {
    fn from(error: serde_json::Error) -> Self {
        match error.classify() {
            serde_json::error::Category::Eof => Self::UnexpectedEnd {
                line: error.line(),
                column: error.column(),
            },
            _ => Self::Syntax(error.to_string()),
        }
    }
}
