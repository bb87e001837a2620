//! Value kind definitions for Larder.
//!
//! This module defines the kinds of values a document field can hold, in the
//! precedence order used when comparing values of different kinds.

use core::fmt;

/// Kinds of values a document field can hold.
///
/// The declaration order is the cross-kind comparison order: a value of an
/// earlier kind always sorts before a value of a later kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    /// Absent or explicitly null field
    Null,
    /// 64-bit signed integer
    Integer,
    /// Point in time stored as Unix milliseconds
    Timestamp,
    /// Boolean (false/true)
    Boolean,
    /// UTF-8 string
    String,
    /// 64-bit floating point number
    Double,
    /// Nested field mapping
    Map,
}

impl ValueKind {
    /// Returns the cross-kind precedence rank of this kind.
    #[inline]
    pub fn precedence(self) -> u8 {
        self as u8
    }

    /// Returns a lowercase name for this kind, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Integer => "integer",
            ValueKind::Timestamp => "timestamp",
            ValueKind::Boolean => "boolean",
            ValueKind::String => "string",
            ValueKind::Double => "double",
            ValueKind::Map => "map",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_precedence() {
        assert!(ValueKind::Null < ValueKind::Integer);
        assert!(ValueKind::Integer < ValueKind::Timestamp);
        assert!(ValueKind::Timestamp < ValueKind::Boolean);
        assert!(ValueKind::Boolean < ValueKind::String);
        assert!(ValueKind::String < ValueKind::Double);
        assert!(ValueKind::Double < ValueKind::Map);
        assert_eq!(ValueKind::Null.precedence(), 0);
        assert_eq!(ValueKind::Map.precedence(), 6);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ValueKind::Timestamp.to_string(), "timestamp");
    }
}
