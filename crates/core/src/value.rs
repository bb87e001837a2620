//! Value type definitions for Larder.
//!
//! This module defines the `Value` enum which represents any value a document
//! field can hold, together with the total ordering used by query filters and
//! sort keys.

use crate::fields::Fields;
use crate::types::ValueKind;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// A value that can be stored in a document field.
#[derive(Clone, Debug)]
pub enum Value {
    /// Null value. Missing fields read as `Null`.
    Null,
    /// 64-bit signed integer
    Integer(i64),
    /// Timestamp stored as Unix milliseconds
    Timestamp(i64),
    /// Boolean value
    Boolean(bool),
    /// UTF-8 string
    String(String),
    /// 64-bit floating point
    Double(f64),
    /// Nested field mapping
    Map(Fields),
}

impl Value {
    /// Creates a timestamp value from Unix milliseconds.
    #[inline]
    pub fn timestamp(millis: i64) -> Self {
        Value::Timestamp(millis)
    }

    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Integer(_) => ValueKind::Integer,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::String(_) => ValueKind::String,
            Value::Double(_) => ValueKind::Double,
            Value::Map(_) => ValueKind::Map,
        }
    }

    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integer if this is an Integer, None otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the Unix milliseconds if this is a Timestamp, None otherwise.
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the boolean if this is a Boolean, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns the double if this is a Double, None otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the nested mapping if this is a Map, None otherwise.
    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }
}

/// Doubles order numerically; NaN sorts below every other double and equals
/// itself, and `-0.0 == 0.0`.
fn cmp_double(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => cmp_double(*a, *b),
            (Value::Map(a), Value::Map(b)) => a.cmp(b),
            // Different kinds: order by kind precedence
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Value::Null => {}
            Value::Integer(i) => i.hash(state),
            Value::Timestamp(t) => t.hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::String(s) => s.hash(state),
            Value::Double(d) => {
                // Canonicalize so equal values hash equally.
                let bits = if d.is_nan() {
                    f64::NAN.to_bits()
                } else if *d == 0.0 {
                    0.0f64.to_bits()
                } else {
                    d.to_bits()
                };
                bits.hash(state)
            }
            Value::Map(m) => m.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "@{}", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Double(v) => write!(f, "{:?}", v),
            Value::Map(m) => {
                f.write_str("{")?;
                for (i, (key, value)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Fields> for Value {
    fn from(v: Fields) -> Self {
        Value::Map(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind() {
        assert_eq!(Value::Integer(42).kind(), ValueKind::Integer);
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(100).as_i64(), Some(100));
        assert_eq!(Value::Double(3.5).as_f64(), Some(3.5));
        assert_eq!(Value::String("hello".into()).as_str(), Some("hello"));
        assert_eq!(Value::timestamp(1234567890).as_timestamp(), Some(1234567890));
        assert_eq!(Value::Integer(1).as_str(), None);
    }

    #[test]
    fn test_cross_kind_precedence() {
        let ordered = [
            Value::Null,
            Value::Integer(i64::MAX),
            Value::Timestamp(i64::MIN),
            Value::Boolean(true),
            Value::String("zzz".into()),
            Value::Double(f64::MIN),
            Value::Map(Fields::new()),
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0] < pair[1], "{} should sort before {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_within_kind_ordering() {
        assert!(Value::Integer(1) < Value::Integer(2));
        assert!(Value::Timestamp(10) < Value::Timestamp(20));
        assert!(Value::Boolean(false) < Value::Boolean(true));
        assert!(Value::String("apple".into()) < Value::String("banana".into()));
        assert!(Value::Double(-1.5) < Value::Double(0.25));
    }

    #[test]
    fn test_integer_and_double_do_not_mix() {
        // Kinds compare by precedence, never numerically across kinds.
        assert!(Value::Integer(100) < Value::Double(1.0));
        assert_ne!(Value::Integer(1), Value::Double(1.0));
    }

    #[test]
    fn test_double_nan_and_zero() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert!(Value::Double(f64::NAN) < Value::Double(f64::NEG_INFINITY));
        assert_eq!(Value::Double(-0.0), Value::Double(0.0));
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        use std::collections::hash_map::DefaultHasher;

        fn hash_of(v: &Value) -> u64 {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        }

        assert_eq!(hash_of(&Value::Double(-0.0)), hash_of(&Value::Double(0.0)));
        assert_eq!(hash_of(&Value::Double(f64::NAN)), hash_of(&Value::Double(-f64::NAN)));
    }

    #[test]
    fn test_map_ordering() {
        let a = Fields::new().with("a", 1);
        let b = Fields::new().with("a", 2);
        let longer = Fields::new().with("a", 1).with("b", 0);
        assert!(Value::Map(a.clone()) < Value::Map(b));
        assert!(Value::Map(a) < Value::Map(longer));
    }

    #[test]
    fn test_value_from_impls() {
        let v: Value = 42i32.into();
        assert_eq!(v.as_i64(), Some(42));

        let v: Value = "hello".into();
        assert_eq!(v.as_str(), Some("hello"));

        let v: Value = Some(100i64).into();
        assert_eq!(v.as_i64(), Some(100));

        let v: Value = None::<i64>.into();
        assert!(v.is_null());
    }

    #[test]
    fn test_value_display() {
        let v = Value::Map(Fields::new().with("n", 1).with("s", "x"));
        assert_eq!(v.to_string(), "{n: 1, s: \"x\"}");
    }
}
