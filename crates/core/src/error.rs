//! Error types for Larder.

use thiserror::Error;

/// Result type alias for Larder operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types shared by every Larder layer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// An entity constructor rejected raw document data.
    #[error("invalid data structure in document {document}: {reason}")]
    InvalidDataStructure { document: String, reason: String },

    /// An update targeted a document that does not exist.
    #[error("document not found: {path}")]
    DocumentNotFound { path: String },

    /// The same document id appeared twice in one ordered result.
    #[error("duplicate document id in ordered result: {id}")]
    DuplicateDocument { id: String },

    /// A collection or document path is malformed.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Opaque failure reported by the backing store or its transport.
    #[error("store error: {message}")]
    Store { message: String },

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates an invalid data structure error.
    pub fn invalid_data(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidDataStructure {
            document: document.into(),
            reason: reason.into(),
        }
    }

    /// Creates a document not found error.
    pub fn document_not_found(path: impl Into<String>) -> Self {
        Error::DocumentNotFound { path: path.into() }
    }

    /// Creates a duplicate document error.
    pub fn duplicate_document(id: impl Into<String>) -> Self {
        Error::DuplicateDocument { id: id.into() }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }
}
