//! Document structure for Larder.
//!
//! A `Document` is one raw snapshot element: a document identifier plus the
//! field mapping stored under it.

use crate::entity::{Entity, Identified};
use crate::error::Result;
use crate::fields::{FieldReader, Fields};
use crate::value::Value;

/// A raw document: identifier plus fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Document {
    id: String,
    fields: Fields,
}

impl Document {
    /// Creates a document with the given identifier and fields.
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Returns the document identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the document fields.
    #[inline]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Reads a field by name or dotted path; missing fields read as `Null`.
    #[inline]
    pub fn value(&self, path: &str) -> &Value {
        self.fields.value(path)
    }

    /// Returns a typed reader that reports errors against this document.
    pub fn reader(&self) -> FieldReader<'_> {
        self.fields.reader(&self.id)
    }

    /// Decodes this document into an entity.
    pub fn decode<E: Entity>(&self) -> Result<E> {
        E::from_document(&self.id, &self.fields)
    }

    /// Splits the document into identifier and fields.
    pub fn into_parts(self) -> (String, Fields) {
        (self.id, self.fields)
    }
}

impl Identified for Document {
    fn document_id(&self) -> &str {
        &self.id
    }
}
