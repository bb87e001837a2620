//! Entity capability.
//!
//! Domain records (items, teams, members, ...) are built from raw document
//! data by their own constructors. The engine is polymorphic over this
//! capability and never sees concrete entity shapes.

use crate::error::Result;
use crate::fields::Fields;

/// Anything identified by a document identifier.
///
/// Identity across two snapshots of a collection is the document id alone,
/// never position or field content.
pub trait Identified {
    /// Returns the document identifier.
    fn document_id(&self) -> &str;
}

/// A domain record that round-trips through raw document fields.
pub trait Entity: Identified + Sized {
    /// Builds the entity from a document id and its raw fields.
    ///
    /// Fails with `Error::InvalidDataStructure` when required fields are
    /// absent or of the wrong kind.
    fn from_document(id: &str, fields: &Fields) -> Result<Self>;

    /// Converts the entity back into raw fields for writing.
    fn to_fields(&self) -> Fields;
}

impl<T: Identified + ?Sized> Identified for &T {
    fn document_id(&self) -> &str {
        (**self).document_id()
    }
}

impl<T: Identified + ?Sized> Identified for std::sync::Arc<T> {
    fn document_id(&self) -> &str {
        (**self).document_id()
    }
}
