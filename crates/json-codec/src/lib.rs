//! json-codec - bidirectional JSON codec combinators.
//!
//! One definition describes both directions: how a typed value is encoded
//! into a [`serde_json::Value`] tree (and on to JSON text), and how such a
//! tree is decoded back, with a [`DecodeError`] on mismatch.
//!
//! Building blocks:
//! - leaf codecs: [`text`], [`number`], [`boolean`], [`any`], [`literal`];
//! - [`sequence`] for homogeneous lists;
//! - [`record`] / [`record_then`] with [`field`] for named heterogeneous fields;
//! - [`one_of`] with [`Variant`] for discriminated unions;
//! - on every [`Codec`]: [`Codec::select_from`], [`Codec::transform`],
//!   [`Codec::filter`] and [`Codec::optional`].
//!
//! ```
//! use json_codec::{field, literal, number, one_of, record_then, Codec, Variant};
//! use serde_json::json;
//!
//! #[derive(Debug, PartialEq)]
//! enum Shape {
//!     Circle(f64),
//!     Square(f64),
//! }
//!
//! fn shape() -> Codec<Shape> {
//!     let circle = record_then(
//!         vec![
//!             field("kind", literal("circle")),
//!             field("radius", number().select_map(|s: &Shape| match s {
//!                 Shape::Circle(r) => *r,
//!                 Shape::Square(_) => 0.0,
//!             })),
//!         ],
//!         |mut r| Ok(Shape::Circle(r.take("radius")?)),
//!     );
//!     let square = record_then(
//!         vec![
//!             field("kind", literal("square")),
//!             field("side", number().select_map(|s: &Shape| match s {
//!                 Shape::Square(side) => *side,
//!                 Shape::Circle(_) => 0.0,
//!             })),
//!         ],
//!         |mut r| Ok(Shape::Square(r.take("side")?)),
//!     );
//!     one_of(vec![
//!         Variant::when(circle, |s| matches!(s, Shape::Circle(_))),
//!         Variant::when(square, |s| matches!(s, Shape::Square(_))),
//!     ])
//! }
//!
//! let text = shape().encode_to_text(&Shape::Square(2.0));
//! assert_eq!(text, r#"{"kind":"square","side":2.0}"#);
//! assert_eq!(shape().decode_from_text(&text), Ok(Shape::Square(2.0)));
//! assert!(shape().decode_from_tree(&json!({"kind": "hexagon"})).is_err());
//! ```

pub mod codec;
pub mod equal;
pub mod error;
pub mod primitives;
pub mod record;
pub mod sequence;
pub mod union;

pub use codec::{lazy, Codec};
pub use error::{DecodeError, DecodeResult};
pub use primitives::{any, boolean, literal, number, text};
pub use record::{field, record, record_then, Field, Record};
pub use sequence::sequence;
pub use union::{one_of, Variant};
