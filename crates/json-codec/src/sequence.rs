//! Homogeneous list codec.

use std::sync::Arc;

use serde_json::Value;

use crate::codec::Codec;
use crate::error::{DecodeError, DecodeResult};

/// Codec for an ordered list whose items all use `element`.
///
/// Decoding stops at the first item that fails and returns that item's
/// failure unchanged. Items of an optional element codec that encode to "no
/// value" are written as `null`.
pub fn sequence<A, X>(element: Codec<A, X>) -> Codec<Vec<A>, Vec<X>>
where
    A: 'static,
    X: 'static,
{
    let encode = Arc::clone(&element.encode);
    let decode = Arc::clone(&element.decode);
    Codec::new(
        move |items: &Vec<X>| {
            Value::Array(
                items
                    .iter()
                    .map(|item| encode(item).unwrap_or(Value::Null))
                    .collect(),
            )
        },
        move |node| {
            let Value::Array(items) = node else {
                return Err(DecodeError::Expected("array"));
            };
            items
                .iter()
                .map(|item| decode(Some(item)))
                .collect::<DecodeResult<Vec<A>>>()
        },
    )
}
