//! Record codecs: heterogeneous named fields encoded as a JSON object.
//!
//! Each field carries its own codec, retargeted onto the whole record with
//! [`Codec::select_from`]. Field order is significant: it is the key order of
//! the encoded object and the order in which fields are decoded, and decoding
//! stops at the first failing field.

use std::any::{type_name, Any};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::codec::Codec;
use crate::error::{DecodeError, DecodeResult};

type Decoded = Box<dyn Any + Send>;

/// One named field of a record over `R`, with its decoded type erased.
pub struct Field<R> {
    name: String,
    codec: Codec<Decoded, R>,
}

impl<R: 'static> Field<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_optional(&self) -> bool {
        self.codec.is_optional()
    }
}

impl<R> Clone for Field<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            codec: self.codec.clone(),
        }
    }
}

impl<R> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("optional", &self.codec.optional)
            .finish()
    }
}

/// Declares a record field named `name` encoded and decoded by `codec`.
pub fn field<A, R>(name: impl Into<String>, codec: Codec<A, R>) -> Field<R>
where
    A: Send + 'static,
    R: 'static,
{
    Field {
        name: name.into(),
        codec: codec.transform(|value| Box::new(value) as Decoded),
    }
}

/// Decoded field values of a record, in declaration order.
///
/// Optional fields that were absent hold `None`, so every declared field has
/// an entry.
#[derive(Default)]
pub struct Record {
    values: Vec<(String, Decoded)>,
}

impl Record {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    /// Borrows a decoded value, if present and of type `T`.
    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        let index = self.position(name)?;
        self.values[index].1.downcast_ref::<T>()
    }

    /// Moves a decoded value out of the record.
    ///
    /// Fails with [`DecodeError::MissingField`] if there is no such field and
    /// with [`DecodeError::FieldType`] if it was decoded as another type; in
    /// the latter case the value stays in the record.
    pub fn take<T: 'static>(&mut self, name: &str) -> DecodeResult<T> {
        let index = self
            .position(name)
            .ok_or_else(|| DecodeError::MissingField(name.to_string()))?;
        let (name, value) = self.values.remove(index);
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => {
                let err = DecodeError::FieldType {
                    field: name.clone(),
                    expected: type_name::<T>(),
                };
                self.values.insert(index, (name, value));
                Err(err)
            }
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.values.iter().position(|(n, _)| n == name)
    }

    fn push(&mut self, name: String, value: Decoded) {
        self.values.push((name, value));
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("fields", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

/// Codec for a record over `R` described by `fields`.
///
/// Encoding writes one key per field in declaration order, leaving out
/// optional fields that have no value. Decoding requires a JSON object and
/// decodes fields in declaration order into a [`Record`]. A missing key fails
/// with "missing field <name>" unless the field is optional; a key that is
/// present is always decoded, whatever its value. Keys not named by any field
/// are ignored.
///
/// # Panics
///
/// Panics if two fields share a name.
pub fn record<R: 'static>(fields: Vec<Field<R>>) -> Codec<Record, R> {
    let mut seen = HashSet::with_capacity(fields.len());
    for field in &fields {
        assert!(
            seen.insert(field.name.as_str()),
            "duplicate record field {}",
            field.name
        );
    }
    let fields: Arc<[Field<R>]> = fields.into();
    let for_encode = Arc::clone(&fields);
    Codec::new(
        move |value: &R| {
            let mut object = Map::with_capacity(for_encode.len());
            for field in for_encode.iter() {
                if let Some(encoded) = (field.codec.encode)(value) {
                    object.insert(field.name.clone(), encoded);
                }
            }
            Value::Object(object)
        },
        move |node| {
            let Value::Object(object) = node else {
                return Err(DecodeError::Expected("object"));
            };
            let mut record = Record {
                values: Vec::with_capacity(fields.len()),
            };
            for field in fields.iter() {
                let entry = object.get(&field.name);
                if entry.is_none() && !field.codec.is_optional() {
                    return Err(DecodeError::MissingField(field.name.clone()));
                }
                let decoded = (field.codec.decode)(entry)?;
                record.push(field.name.clone(), decoded);
            }
            Ok(record)
        },
    )
}

/// [`record`] followed by [`Codec::try_transform`]: decodes the fields, then
/// builds the target value from the [`Record`].
///
/// ```
/// use json_codec::{field, number, record_then, text};
/// use serde_json::json;
///
/// #[derive(Debug, PartialEq)]
/// struct Person {
///     name: String,
///     age: Option<f64>,
/// }
///
/// let person = record_then(
///     vec![
///         field("name", text().select_from(|p: &Person| &p.name)),
///         field("age", number().optional().select_from(|p: &Person| &p.age)),
///     ],
///     |mut r| {
///         Ok(Person {
///             name: r.take("name")?,
///             age: r.take("age")?,
///         })
///     },
/// );
///
/// let john = Person { name: "John".into(), age: None };
/// assert_eq!(person.encode_to_tree(&john), json!({"name": "John"}));
/// assert_eq!(person.decode_from_text(r#"{"name":"John"}"#), Ok(john));
/// ```
pub fn record_then<T, R, F>(fields: Vec<Field<R>>, build: F) -> Codec<T, R>
where
    T: 'static,
    R: 'static,
    F: Fn(Record) -> DecodeResult<T> + Send + Sync + 'static,
{
    record(fields).try_transform(build)
}
