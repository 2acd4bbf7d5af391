//! Leaf codecs: text, number, boolean, raw JSON and literal constants.

use std::sync::LazyLock;

use serde_json::Value;

use crate::codec::Codec;
use crate::equal::deep_equal;
use crate::error::DecodeError;

static TEXT: LazyLock<Codec<String>> = LazyLock::new(|| {
    Codec::new(
        |value: &String| Value::String(value.clone()),
        |node| match node {
            Value::String(s) => Ok(s.clone()),
            _ => Err(DecodeError::Expected("string")),
        },
    )
});

static NUMBER: LazyLock<Codec<f64>> = LazyLock::new(|| {
    Codec::new(
        |value: &f64| Value::from(*value),
        |node| node.as_f64().ok_or(DecodeError::Expected("number")),
    )
});

static BOOLEAN: LazyLock<Codec<bool>> = LazyLock::new(|| {
    Codec::new(
        |value: &bool| Value::Bool(*value),
        |node| node.as_bool().ok_or(DecodeError::Expected("boolean")),
    )
});

static ANY: LazyLock<Codec<Value>> =
    LazyLock::new(|| Codec::new(|value: &Value| value.clone(), |node| Ok(node.clone())));

/// JSON strings.
pub fn text() -> Codec<String> {
    TEXT.clone()
}

/// JSON numbers as `f64`.
///
/// Any JSON number is accepted; there is no integer or range check. Non-finite
/// values encode as `null`, as JSON has no representation for them.
pub fn number() -> Codec<f64> {
    NUMBER.clone()
}

/// JSON booleans.
pub fn boolean() -> Codec<bool> {
    BOOLEAN.clone()
}

/// Any JSON value, passed through unchanged.
pub fn any() -> Codec<Value> {
    ANY.clone()
}

/// A fixed constant, typically the tag field of a union variant.
///
/// Encoding ignores its input and always yields `value`. Decoding succeeds
/// only on a node deeply equal to `value` (see [`deep_equal`]).
///
/// ```
/// use json_codec::literal;
/// use serde_json::json;
///
/// let tag = literal::<()>("circle");
/// assert_eq!(tag.encode_to_tree(&()), json!("circle"));
/// assert!(tag.decode_from_tree(&json!("square")).is_err());
/// ```
pub fn literal<X: 'static>(value: impl Into<Value>) -> Codec<Value, X> {
    let expected: Value = value.into();
    let encoded = expected.clone();
    Codec::new(
        move |_: &X| encoded.clone(),
        move |node| {
            if deep_equal(node, &expected) {
                Ok(expected.clone())
            } else {
                Err(DecodeError::Literal(expected.clone()))
            }
        },
    )
}
