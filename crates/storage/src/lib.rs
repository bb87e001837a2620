//! Larder Storage - Writes and the document store capability.
//!
//! This crate provides the storage side of Larder:
//!
//! - `WriteBatch`: Ordered writes with server timestamp and field delete placeholders
//! - `CommitJournal`: Stages a batch over committed state and records net changes
//! - `DocumentStore`: The capability every backing store implements
//! - `MemoryStore`: An in-memory store with atomic commits and listeners
//! - `Clock`: Commit time source (`SystemClock`, `ManualClock`)
//!
//! # Example
//!
//! ```rust
//! use larder_core::{CollectionPath, Fields};
//! use larder_storage::{DocumentStore, MemoryStore, WriteBatch};
//!
//! let store = MemoryStore::new();
//! let items = CollectionPath::parse("team/t1/item").unwrap();
//!
//! let mut batch = WriteBatch::new();
//! batch.set(items.document_with_id("milk").unwrap(), Fields::new().with("count", 2));
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let receipt = rt.block_on(store.commit(batch.into_operations())).unwrap();
//! assert_eq!(receipt.events.len(), 1);
//! assert_eq!(store.get(&items).unwrap().len(), 1);
//! ```

pub mod batch;
pub mod clock;
pub mod journal;
pub mod memory;
pub mod store;

pub use batch::{WriteBatch, WriteData, WriteOp, WriteValue};
pub use clock::{Clock, ManualClock, SystemClock};
pub use journal::{CollectionDiff, CommitJournal, CommitReceipt, DocumentEvent, StagedCommit};
pub use memory::MemoryStore;
pub use store::{
    CollectionListener, CollectionSnapshot, DocumentListener, DocumentSnapshot, DocumentStore,
    ListenerRegistration,
};
