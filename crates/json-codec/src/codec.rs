//! The bidirectional codec core.
//!
//! A [`Codec<A, X>`] pairs an encode function (`&X -> Value`) with a decode
//! function (`&Value -> DecodeResult<A>`). Freshly built codecs have `A == X`;
//! [`Codec::select_from`] and [`Codec::transform`] let the two sides diverge.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::error::{DecodeError, DecodeResult};

/// Encode side. `None` means "no value": a record omits the key.
pub(crate) type EncodeFn<X> = dyn Fn(&X) -> Option<Value> + Send + Sync;

/// Decode side. `None` input means the entry was absent from its container.
pub(crate) type DecodeFn<A> = dyn Fn(Option<&Value>) -> DecodeResult<A> + Send + Sync;

/// Bidirectional encoding between `X` (encode input), `A` (decode output)
/// and the generic JSON tree.
///
/// Codecs are immutable after construction. Cloning shares the underlying
/// functions, and every codec is `Send + Sync`.
pub struct Codec<A, X = A> {
    pub(crate) encode: Arc<EncodeFn<X>>,
    pub(crate) decode: Arc<DecodeFn<A>>,
    pub(crate) optional: Optionality,
}

/// Whether a codec tolerates an absent entry.
#[derive(Clone)]
pub(crate) enum Optionality {
    Known(bool),
    /// Answered by a codec that is built on first use (see [`lazy`]).
    Deferred(Arc<dyn Fn() -> bool + Send + Sync>),
}

impl Optionality {
    pub(crate) fn get(&self) -> bool {
        match self {
            Self::Known(optional) => *optional,
            Self::Deferred(resolve) => resolve(),
        }
    }
}

impl fmt::Debug for Optionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(optional) => write!(f, "{optional}"),
            Self::Deferred(_) => f.write_str("deferred"),
        }
    }
}

impl<A, X> Clone for Codec<A, X> {
    fn clone(&self) -> Self {
        Self {
            encode: Arc::clone(&self.encode),
            decode: Arc::clone(&self.decode),
            optional: self.optional.clone(),
        }
    }
}

impl<A, X> fmt::Debug for Codec<A, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}

impl<A: 'static, X: 'static> Codec<A, X> {
    /// Builds a codec from a raw encode/decode pair.
    ///
    /// Nothing is validated here; `decode` sees whatever node it is given.
    pub fn new<E, D>(encode: E, decode: D) -> Self
    where
        E: Fn(&X) -> Value + Send + Sync + 'static,
        D: Fn(&Value) -> DecodeResult<A> + Send + Sync + 'static,
    {
        Self {
            encode: Arc::new(move |value: &X| Some(encode(value))),
            decode: Arc::new(move |node: Option<&Value>| match node {
                Some(node) => decode(node),
                None => Err(DecodeError::Expected("value")),
            }),
            optional: Optionality::Known(false),
        }
    }

    /// Whether this codec tolerates an absent entry (see [`Codec::optional`]).
    ///
    /// For a codec returned by [`lazy`] this builds the deferred codec.
    pub fn is_optional(&self) -> bool {
        self.optional.get()
    }

    /// Encodes a value into a generic JSON tree.
    ///
    /// An optional codec given `None` produces `Value::Null`.
    pub fn encode_to_tree(&self, value: &X) -> Value {
        (self.encode)(value).unwrap_or(Value::Null)
    }

    /// Encodes a value into compact JSON text.
    pub fn encode_to_text(&self, value: &X) -> String {
        self.encode_to_tree(value).to_string()
    }

    /// Encodes a value into indented JSON text.
    pub fn encode_to_pretty_text(&self, value: &X) -> String {
        format!("{:#}", self.encode_to_tree(value))
    }

    pub fn decode_from_tree(&self, node: &Value) -> DecodeResult<A> {
        (self.decode)(Some(node))
    }

    /// Parses JSON text and decodes the resulting tree.
    ///
    /// Malformed text is reported as [`DecodeError::Parse`].
    pub fn decode_from_text(&self, text: &str) -> DecodeResult<A> {
        let node: Value = serde_json::from_str(text).map_err(|err| {
            tracing::debug!(error = %err, "rejected malformed JSON text");
            DecodeError::Parse(err.to_string())
        })?;
        self.decode_from_tree(&node)
    }

    /// Retargets the encode side onto a larger type by borrowing the part
    /// this codec knows how to encode. The decode side is unchanged.
    ///
    /// ```
    /// use json_codec::text;
    ///
    /// struct User {
    ///     name: String,
    /// }
    ///
    /// let name = text().select_from(|user: &User| &user.name);
    /// let tree = name.encode_to_tree(&User { name: "Ada".into() });
    /// assert_eq!(tree, serde_json::json!("Ada"));
    /// ```
    pub fn select_from<Y, F>(&self, project: F) -> Codec<A, Y>
    where
        Y: 'static,
        F: Fn(&Y) -> &X + Send + Sync + 'static,
    {
        let encode = Arc::clone(&self.encode);
        Codec {
            encode: Arc::new(move |value: &Y| encode(project(value))),
            decode: Arc::clone(&self.decode),
            optional: self.optional.clone(),
        }
    }

    /// Like [`Codec::select_from`], for projections that compute an owned
    /// value instead of borrowing one.
    pub fn select_map<Y, F>(&self, project: F) -> Codec<A, Y>
    where
        Y: 'static,
        F: Fn(&Y) -> X + Send + Sync + 'static,
    {
        let encode = Arc::clone(&self.encode);
        Codec {
            encode: Arc::new(move |value: &Y| encode(&project(value))),
            decode: Arc::clone(&self.decode),
            optional: self.optional.clone(),
        }
    }

    /// Maps successfully decoded values through `f`. Failures pass through
    /// untouched and `f` is not called for them.
    pub fn transform<B, F>(&self, f: F) -> Codec<B, X>
    where
        B: 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let decode = Arc::clone(&self.decode);
        Codec {
            encode: Arc::clone(&self.encode),
            decode: Arc::new(move |node: Option<&Value>| decode(node).map(&f)),
            optional: self.optional.clone(),
        }
    }

    /// Like [`Codec::transform`], but `f` may itself reject the value.
    pub fn try_transform<B, F>(&self, f: F) -> Codec<B, X>
    where
        B: 'static,
        F: Fn(A) -> DecodeResult<B> + Send + Sync + 'static,
    {
        let decode = Arc::clone(&self.decode);
        Codec {
            encode: Arc::clone(&self.encode),
            decode: Arc::new(move |node: Option<&Value>| decode(node).and_then(&f)),
            optional: self.optional.clone(),
        }
    }

    /// Rejects decoded values for which `predicate` returns `false`, failing
    /// with `message`. The predicate only runs on successful decodes.
    pub fn filter<P>(&self, message: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&A) -> bool + Send + Sync + 'static,
    {
        let mut message = message.into();
        if message.is_empty() {
            message = "rejected by filter".to_string();
        }
        let decode = Arc::clone(&self.decode);
        Self {
            encode: Arc::clone(&self.encode),
            decode: Arc::new(move |node: Option<&Value>| {
                let value = decode(node)?;
                if predicate(&value) {
                    Ok(value)
                } else {
                    Err(DecodeError::Rejected(message.clone()))
                }
            }),
            optional: self.optional.clone(),
        }
    }

    /// Makes the value optional.
    ///
    /// `None` encodes to "no value", so a record leaves the key out entirely.
    /// An absent entry decodes to `None`. An explicit `null` goes through this
    /// codec first and becomes `None` only if this codec rejects it, so codecs
    /// that accept `null` (such as [`any`](crate::any)) keep `Some(null)`.
    /// Any other node goes through this codec.
    pub fn optional(&self) -> Codec<Option<A>, Option<X>> {
        let encode = Arc::clone(&self.encode);
        let decode = Arc::clone(&self.decode);
        Codec {
            encode: Arc::new(move |value: &Option<X>| value.as_ref().and_then(|v| encode(v))),
            decode: Arc::new(move |node: Option<&Value>| match node {
                None => Ok(None),
                Some(Value::Null) => Ok(decode(Some(&Value::Null)).ok()),
                Some(node) => decode(Some(node)).map(Some),
            }),
            optional: Optionality::Known(true),
        }
    }
}

struct Deferred<A, X, F> {
    cell: OnceLock<Codec<A, X>>,
    build: F,
}

impl<A: 'static, X: 'static, F: Fn() -> Codec<A, X>> Deferred<A, X, F> {
    fn get(&self) -> &Codec<A, X> {
        self.cell.get_or_init(&self.build)
    }
}

/// Defers building a codec until it is first used, then caches it.
///
/// This is what makes self-referential definitions terminate:
///
/// ```
/// use json_codec::{field, lazy, number, record_then, sequence, Codec};
///
/// #[derive(Debug, PartialEq)]
/// struct Node {
///     value: f64,
///     children: Vec<Node>,
/// }
///
/// fn node() -> Codec<Node> {
///     record_then(
///         vec![
///             field("value", number().select_from(|n: &Node| &n.value)),
///             field("children", sequence(lazy(node)).select_from(|n: &Node| &n.children)),
///         ],
///         |mut r| {
///             Ok(Node {
///                 value: r.take("value")?,
///                 children: r.take("children")?,
///             })
///         },
///     )
/// }
///
/// let decoded = node().decode_from_text(r#"{"value":1,"children":[{"value":2,"children":[]}]}"#);
/// assert_eq!(decoded.unwrap().children[0].value, 2.0);
/// ```
///
/// The returned codec is optional exactly when the built one is; asking
/// (including a record decoding an absent key) builds it.
pub fn lazy<A, X, F>(build: F) -> Codec<A, X>
where
    A: 'static,
    X: 'static,
    F: Fn() -> Codec<A, X> + Send + Sync + 'static,
{
    let deferred = Arc::new(Deferred {
        cell: OnceLock::new(),
        build,
    });
    let for_encode = Arc::clone(&deferred);
    let for_optional = Arc::clone(&deferred);
    Codec {
        encode: Arc::new(move |value: &X| (for_encode.get().encode)(value)),
        decode: Arc::new(move |node: Option<&Value>| (deferred.get().decode)(node)),
        optional: Optionality::Deferred(Arc::new(move || for_optional.get().is_optional())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{any, literal, number, text};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn raw_codec_encodes_and_decodes() {
        let upper: Codec<String> = Codec::new(
            |s: &String| Value::String(s.to_uppercase()),
            |node| {
                node.as_str()
                    .map(str::to_lowercase)
                    .ok_or(DecodeError::Expected("string"))
            },
        );
        assert_eq!(upper.encode_to_tree(&"abc".to_string()), json!("ABC"));
        assert_eq!(upper.decode_from_tree(&json!("XyZ")), Ok("xyz".to_string()));
        assert_eq!(
            upper.decode_from_tree(&json!(1)),
            Err(DecodeError::Expected("string"))
        );
    }

    #[test]
    fn text_boundary_matrix() {
        assert_eq!(number().encode_to_text(&1.5), "1.5");
        assert_eq!(number().decode_from_text(" 42 "), Ok(42.0));
        assert!(matches!(
            number().decode_from_text("{nope"),
            Err(DecodeError::Parse(_))
        ));
        assert!(matches!(number().decode_from_text(""), Err(DecodeError::Parse(_))));
        assert_eq!(
            number().decode_from_text(r#""42""#),
            Err(DecodeError::Expected("number"))
        );
    }

    #[test]
    fn pretty_text_of_scalar_matches_compact() {
        let pretty = text().optional().encode_to_pretty_text(&Some("x".to_string()));
        assert_eq!(pretty, r#""x""#);
    }

    #[test]
    fn transform_skips_failed_decodes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let doubled = number().transform(move |n| {
            counter.fetch_add(1, Ordering::SeqCst);
            n * 2.0
        });
        assert_eq!(doubled.decode_from_tree(&json!(4)), Ok(8.0));
        assert_eq!(
            doubled.decode_from_tree(&json!("4")),
            Err(DecodeError::Expected("number"))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Encode side is untouched.
        assert_eq!(doubled.encode_to_tree(&4.0), json!(4.0));
    }

    #[test]
    fn try_transform_can_reject() {
        let port = number().try_transform(|n| {
            if n.fract() == 0.0 && (0.0..=65535.0).contains(&n) {
                Ok(n as u16)
            } else {
                Err(DecodeError::custom("not a port"))
            }
        });
        assert_eq!(port.decode_from_tree(&json!(8080)), Ok(8080));
        assert_eq!(
            port.decode_from_tree(&json!(1.5)),
            Err(DecodeError::Custom("not a port".into()))
        );
    }

    #[test]
    fn filter_matrix() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let positive = number().filter("must be positive", move |n| {
            counter.fetch_add(1, Ordering::SeqCst);
            *n > 0.0
        });
        assert_eq!(positive.decode_from_tree(&json!(3)), Ok(3.0));
        assert_eq!(
            positive.decode_from_tree(&json!(-3)),
            Err(DecodeError::Rejected("must be positive".into()))
        );
        assert_eq!(
            positive.decode_from_tree(&json!(true)),
            Err(DecodeError::Expected("number"))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let unnamed = number().filter("", |_| false);
        assert_eq!(
            unnamed.decode_from_tree(&json!(1)).unwrap_err().message(),
            "rejected by filter"
        );
    }

    #[test]
    fn select_map_computes_projection() {
        struct Span {
            start: f64,
            end: f64,
        }
        let width = number().select_map(|s: &Span| s.end - s.start);
        assert_eq!(width.encode_to_tree(&Span { start: 2.0, end: 5.0 }), json!(3.0));
        assert_eq!(width.decode_from_tree(&json!(3)), Ok(3.0));
    }

    #[test]
    fn optional_matrix() {
        let maybe = number().optional();
        assert!(maybe.is_optional());
        assert!(!number().is_optional());
        assert_eq!(maybe.encode_to_tree(&Some(1.0)), json!(1.0));
        assert_eq!(maybe.encode_to_tree(&None), Value::Null);
        assert_eq!(maybe.decode_from_tree(&json!(1)), Ok(Some(1.0)));
        assert_eq!(maybe.decode_from_tree(&Value::Null), Ok(None));
        assert_eq!((maybe.decode)(None), Ok(None));
        assert_eq!(
            maybe.decode_from_tree(&json!("1")),
            Err(DecodeError::Expected("number"))
        );
    }

    #[test]
    fn optional_flag_survives_composition() {
        let maybe = number().optional();
        assert!(maybe.transform(|n| n.is_some()).is_optional());
        assert!(maybe.filter("x", |_| true).is_optional());
        assert!(maybe
            .select_from(|pair: &(Option<f64>, String)| &pair.0)
            .is_optional());
    }

    #[test]
    fn optional_keeps_null_accepted_by_base() {
        let raw = any().optional();
        assert_eq!(raw.decode_from_tree(&Value::Null), Ok(Some(Value::Null)));
        assert_eq!(raw.encode_to_tree(&Some(Value::Null)), Value::Null);
        assert_eq!((raw.decode)(None), Ok(None));

        let nothing = literal::<()>(Value::Null).optional();
        assert_eq!(nothing.decode_from_tree(&Value::Null), Ok(Some(Value::Null)));

        let nested = number().optional().optional();
        assert_eq!(nested.decode_from_tree(&Value::Null), Ok(Some(None)));
        assert_eq!((nested.decode)(None), Ok(None));
    }

    #[test]
    fn lazy_reports_optionality_of_built_codec() {
        static BUILDS: AtomicUsize = AtomicUsize::new(0);
        let deferred = lazy(|| {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            number().optional()
        });
        assert_eq!(BUILDS.load(Ordering::SeqCst), 0);
        assert!(deferred.is_optional());
        assert!(deferred.transform(|n| n.unwrap_or(0.0)).is_optional());
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        assert!(!lazy(text).is_optional());
    }

    #[test]
    fn lazy_builds_once_on_first_use() {
        static BUILDS: AtomicUsize = AtomicUsize::new(0);
        let deferred = lazy(|| {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            text()
        });
        assert_eq!(BUILDS.load(Ordering::SeqCst), 0);
        assert_eq!(deferred.decode_from_tree(&json!("a")), Ok("a".to_string()));
        assert_eq!(deferred.encode_to_tree(&"b".to_string()), json!("b"));
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn codecs_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Codec<String>>();
        assert_send_sync::<Codec<Option<f64>, Option<f64>>>();
        assert_send_sync::<Codec<std::rc::Rc<u8>, std::rc::Rc<u8>>>();
    }
}
