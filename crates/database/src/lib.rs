//! Larder - Typed live collections over a document store.
//!
//! This crate provides the public API of Larder: a `DataStore` facade that
//! turns live queries into ordered `CollectionChange`s for UI lists and
//! routes writes through atomic batches.
//!
//! # Core Components
//!
//! - `DataStore`: Observe, read and write entities over an injected `DocumentStore`
//! - `DataStoreConfig`: Invalid document policy and initial emission settings
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use larder_core::{CollectionPath, Entity, Fields, Identified, Result};
//! use larder_database::DataStore;
//! use larder_query::{Direction, Query};
//! use larder_storage::MemoryStore;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Item { id: String, name: String }
//!
//! impl Identified for Item {
//!     fn document_id(&self) -> &str { &self.id }
//! }
//!
//! impl Entity for Item {
//!     fn from_document(id: &str, fields: &Fields) -> Result<Self> {
//!         let name = fields.reader(id).require_str("name")?.to_string();
//!         Ok(Item { id: id.to_string(), name })
//!     }
//!     fn to_fields(&self) -> Fields { Fields::new().with("name", self.name.as_str()) }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let data = DataStore::new(Arc::new(MemoryStore::new()));
//! let items = CollectionPath::parse("team/t1/item").unwrap();
//! let query = Query::new(items.clone()).order_by("name", Direction::Ascending);
//!
//! let names = Arc::new(Mutex::new(Vec::new()));
//! let sink = names.clone();
//! let subscription = data.observe::<Item, _>(&query, move |change| {
//!     let change = change.unwrap();
//!     *sink.lock().unwrap() = change.result().iter().map(|i| i.name.clone()).collect::<Vec<_>>();
//! });
//!
//! data.write(|batch| {
//!     batch.set(items.document(), Fields::new().with("name", "Milk"));
//!     batch.set(items.document(), Fields::new().with("name", "Eggs"));
//! })
//! .await
//! .unwrap();
//!
//! assert_eq!(*names.lock().unwrap(), vec!["Eggs", "Milk"]);
//! subscription.cancel();
//! # });
//! ```

pub mod config;
pub mod database;

pub use config::DataStoreConfig;
pub use database::DataStore;
