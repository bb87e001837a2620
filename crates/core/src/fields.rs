//! Field mappings for Larder documents.
//!
//! `Fields` is the raw key/value mapping stored in a document. Lookups accept
//! dotted paths (`owner.name`) that descend into nested maps; a missing field
//! reads as `Value::Null`.

use crate::error::{Error, Result};
use crate::types::ValueKind;
use crate::value::Value;
use std::collections::btree_map::{self, BTreeMap};

static NULL: Value = Value::Null;

/// Ordered mapping of field names to values.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns this mapping with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Sets a top-level field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes a top-level field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Looks up a field by name or dotted path.
    ///
    /// An exact top-level key wins over a dotted descent, so keys that
    /// themselves contain dots stay addressable.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.0.get(path) {
            return Some(value);
        }
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_map()?.0.get(segment)?;
        }
        Some(current)
    }

    /// Looks up a field, reading missing fields as `Null`.
    #[inline]
    pub fn value(&self, path: &str) -> &Value {
        self.get(path).unwrap_or(&NULL)
    }

    /// Returns true if the field exists (even when its value is `Null`).
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Returns the number of top-level fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates top-level fields in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Iterates top-level field names in order.
    pub fn keys(&self) -> btree_map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Shallow-merges `other` into this mapping. Fields named in `other`
    /// overwrite; all others survive.
    pub fn merge(&mut self, other: Fields) {
        self.0.extend(other.0);
    }

    /// Returns a typed reader over these fields for decoding document `document`.
    pub fn reader<'a>(&'a self, document: &'a str) -> FieldReader<'a> {
        FieldReader {
            document,
            fields: self,
        }
    }
}

impl From<BTreeMap<String, Value>> for Fields {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Typed accessors used by entity constructors.
///
/// Every failure is reported as `Error::InvalidDataStructure` naming the
/// document and the offending field.
#[derive(Clone, Copy, Debug)]
pub struct FieldReader<'a> {
    document: &'a str,
    fields: &'a Fields,
}

impl<'a> FieldReader<'a> {
    /// Returns the document id this reader reports errors against.
    #[inline]
    pub fn document(&self) -> &'a str {
        self.document
    }

    fn typed<T>(
        &self,
        field: &str,
        kind: ValueKind,
        extract: impl Fn(&'a Value) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => extract(value).map(Some).ok_or_else(|| {
                Error::invalid_data(
                    self.document,
                    format!("field `{}` expected {}, got {}", field, kind, value.kind()),
                )
            }),
        }
    }

    fn missing(&self, field: &str) -> Error {
        Error::invalid_data(self.document, format!("missing required field `{}`", field))
    }

    /// Reads a required string field.
    pub fn require_str(&self, field: &str) -> Result<&'a str> {
        self.optional_str(field)?.ok_or_else(|| self.missing(field))
    }

    /// Reads a required integer field.
    pub fn require_i64(&self, field: &str) -> Result<i64> {
        self.optional_i64(field)?.ok_or_else(|| self.missing(field))
    }

    /// Reads a required double field.
    pub fn require_f64(&self, field: &str) -> Result<f64> {
        self.optional_f64(field)?.ok_or_else(|| self.missing(field))
    }

    /// Reads a required boolean field.
    pub fn require_bool(&self, field: &str) -> Result<bool> {
        self.optional_bool(field)?.ok_or_else(|| self.missing(field))
    }

    /// Reads a required timestamp field as Unix milliseconds.
    pub fn require_timestamp(&self, field: &str) -> Result<i64> {
        self.optional_timestamp(field)?.ok_or_else(|| self.missing(field))
    }

    /// Reads a required nested map field.
    pub fn require_map(&self, field: &str) -> Result<&'a Fields> {
        self.typed(field, ValueKind::Map, Value::as_map)?
            .ok_or_else(|| self.missing(field))
    }

    /// Reads an optional string field. Missing and null read as `None`.
    pub fn optional_str(&self, field: &str) -> Result<Option<&'a str>> {
        self.typed(field, ValueKind::String, Value::as_str)
    }

    /// Reads an optional integer field.
    pub fn optional_i64(&self, field: &str) -> Result<Option<i64>> {
        self.typed(field, ValueKind::Integer, Value::as_i64)
    }

    /// Reads an optional double field.
    pub fn optional_f64(&self, field: &str) -> Result<Option<f64>> {
        self.typed(field, ValueKind::Double, Value::as_f64)
    }

    /// Reads an optional boolean field.
    pub fn optional_bool(&self, field: &str) -> Result<Option<bool>> {
        self.typed(field, ValueKind::Boolean, Value::as_bool)
    }

    /// Reads an optional timestamp field.
    pub fn optional_timestamp(&self, field: &str) -> Result<Option<i64>> {
        self.typed(field, ValueKind::Timestamp, Value::as_timestamp)
    }
}
