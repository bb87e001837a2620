//! Larder Core - Core types for the Larder live collection engine.
//!
//! This crate provides the foundational types shared by every Larder layer:
//!
//! - `Value`: Closed set of field values with a total cross-kind ordering
//! - `Fields`: A document's raw field mapping, with dotted-path lookup
//! - `Document`: A document identifier plus its fields
//! - `CollectionPath` / `DocumentPath`: Store addressing
//! - `Entity`: Capability for decoding domain records from documents
//! - `Error`: Error types for every layer
//!
//! # Example
//!
//! ```rust
//! use larder_core::{CollectionPath, Document, Fields, Value};
//!
//! let items = CollectionPath::parse("team/t1/item").unwrap();
//! let path = items.document_with_id("milk").unwrap();
//! assert_eq!(path.to_string(), "/team/t1/item/milk");
//!
//! let doc = Document::new(path.id(), Fields::new().with("count", 2));
//! assert_eq!(doc.value("count"), &Value::Integer(2));
//! assert!(doc.value("missing").is_null());
//! ```

mod document;
mod entity;
mod error;
mod fields;
pub mod path;
mod types;
mod value;

pub use document::Document;
pub use entity::{Entity, Identified};
pub use error::{Error, Result};
pub use fields::{FieldReader, Fields};
pub use path::{auto_id, CollectionPath, DocumentPath};
pub use types::ValueKind;
pub use value::Value;
