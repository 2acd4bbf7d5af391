//! Decode failure type.

use serde_json::Value;
use thiserror::Error;

/// Outcome of every decode operation.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Reason a generic tree (or text) could not be decoded into a typed value.
///
/// Nested failures are returned as-is by the compound codecs: a failure inside
/// a record field, a sequence item or a union variant carries no location.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// The node is not of the expected kind (`"string"`, `"array"`, ...).
    #[error("expected {0}")]
    Expected(&'static str),
    /// The node is not equal to the expected constant.
    #[error("expected literal {0}")]
    Literal(Value),
    #[error("missing field {0}")]
    MissingField(String),
    /// A `filter` predicate refused an otherwise valid value.
    #[error("{0}")]
    Rejected(String),
    /// Every union variant failed; holds each variant's failure in order.
    #[error("{}", no_variant_message(.0))]
    NoVariant(Vec<DecodeError>),
    #[error("invalid JSON: {0}")]
    Parse(String),
    /// A decoded record field was taken out as the wrong Rust type.
    #[error("field {field} is not a {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },
    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    /// Failure with a free-form message, for user-written decode functions.
    pub fn custom(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            return Self::Custom("decode failed".to_string());
        }
        Self::Custom(message)
    }

    /// Human-readable message, identical to the `Display` output.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

fn no_variant_message(errors: &[DecodeError]) -> String {
    if errors.is_empty() {
        return "no variant matched".to_string();
    }
    let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!("no variant matched: {}", reasons.join("; "))
}
