//! Discriminated unions.
//!
//! A union is an ordered list of [`Variant`]s. Encoding hands the value to the
//! first variant that claims it; decoding tries each variant in order and
//! keeps the first success.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::codec::{Codec, DecodeFn};
use crate::error::DecodeError;

/// `Some(encoded)` when the value belongs to this variant.
type TryEncodeFn<T> = dyn Fn(&T) -> Option<Option<Value>> + Send + Sync;

/// One alternative of a union over `T`.
pub struct Variant<T> {
    encode: Arc<TryEncodeFn<T>>,
    decode: Arc<DecodeFn<T>>,
}

impl<T: 'static> Variant<T> {
    /// Pairs a codec with a membership test on the union type.
    pub fn when<P>(codec: Codec<T, T>, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let encode = Arc::clone(&codec.encode);
        Self {
            encode: Arc::new(move |value: &T| predicate(value).then(|| encode(value))),
            decode: codec.decode,
        }
    }

    /// Pairs a codec over the variant's payload `V` with a projection that
    /// extracts the payload when the value belongs to this variant.
    ///
    /// ```
    /// use json_codec::{number, one_of, Variant};
    /// use serde_json::json;
    ///
    /// #[derive(Debug, PartialEq)]
    /// enum Id {
    ///     Num(f64),
    ///     Name(String),
    /// }
    ///
    /// let id = one_of(vec![
    ///     Variant::new(number().transform(Id::Num), |id: &Id| match id {
    ///         Id::Num(n) => Some(n),
    ///         _ => None,
    ///     }),
    ///     Variant::new(json_codec::text().transform(Id::Name), |id: &Id| match id {
    ///         Id::Name(s) => Some(s),
    ///         _ => None,
    ///     }),
    /// ]);
    /// assert_eq!(id.encode_to_tree(&Id::Num(7.0)), json!(7.0));
    /// assert_eq!(id.decode_from_tree(&json!("x")), Ok(Id::Name("x".into())));
    /// ```
    pub fn new<V, P>(codec: Codec<T, V>, project: P) -> Self
    where
        V: 'static,
        P: Fn(&T) -> Option<&V> + Send + Sync + 'static,
    {
        let encode = Arc::clone(&codec.encode);
        Self {
            encode: Arc::new(move |value: &T| project(value).map(|payload| encode(payload))),
            decode: codec.decode,
        }
    }
}

impl<T> Clone for Variant<T> {
    fn clone(&self) -> Self {
        Self {
            encode: Arc::clone(&self.encode),
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<T> fmt::Debug for Variant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant").finish_non_exhaustive()
    }
}

/// Codec choosing among `variants`, first match wins in both directions.
///
/// Decoding fails with [`DecodeError::NoVariant`] listing every variant's
/// failure when none of them accepts the node.
///
/// # Panics
///
/// Encoding panics if the value belongs to none of the variants. Every value
/// passed to a union must match at least one declared variant.
pub fn one_of<T: 'static>(variants: Vec<Variant<T>>) -> Codec<T, T> {
    let variants: Arc<[Variant<T>]> = variants.into();
    let for_encode = Arc::clone(&variants);
    Codec::new(
        move |value: &T| {
            for variant in for_encode.iter() {
                if let Some(encoded) = (variant.encode)(value) {
                    return encoded.unwrap_or(Value::Null);
                }
            }
            panic!(
                "value matches none of the {} union variants",
                for_encode.len()
            );
        },
        move |node| {
            let mut errors = Vec::with_capacity(variants.len());
            for variant in variants.iter() {
                match (variant.decode)(Some(node)) {
                    Ok(value) => return Ok(value),
                    Err(err) => errors.push(err),
                }
            }
            tracing::trace!(variants = variants.len(), "no union variant matched");
            Err(DecodeError::NoVariant(errors))
        },
    )
}
