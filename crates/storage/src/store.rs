//! The document store capability.
//!
//! Everything above this layer talks to a backing store through
//! `DocumentStore`: snapshot listeners per collection or document, one-shot
//! reads, and atomic batch commits.

use crate::batch::WriteOp;
use crate::journal::CommitReceipt;
use async_trait::async_trait;
use larder_core::{CollectionPath, Document, DocumentPath, Result};
use larder_reactive::Subscription;
use std::ops::ControlFlow;

/// Snapshot payload delivered to collection listeners.
pub type CollectionSnapshot = Result<Vec<Document>>;

/// Snapshot payload delivered to document listeners.
pub type DocumentSnapshot = Result<Option<Document>>;

/// Collection listener. Returning `Break` ends the registration.
pub type CollectionListener = Box<dyn Fn(&CollectionSnapshot) -> ControlFlow<()> + Send + Sync>;

/// Document listener. Returning `Break` ends the registration.
pub type DocumentListener = Box<dyn Fn(&DocumentSnapshot) -> ControlFlow<()> + Send + Sync>;

/// Handle that releases a listener registration when cancelled or dropped.
pub type ListenerRegistration = Subscription;

/// A backing document store.
///
/// Listeners receive the current snapshot as soon as they are registered and
/// then one snapshot per commit that changes what they observe, in commit
/// order. Collection snapshots are unordered; ordering is the query's job.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Registers a listener for every document in `collection`.
    fn listen(&self, collection: &CollectionPath, listener: CollectionListener) -> ListenerRegistration;

    /// Registers a listener for a single document.
    fn listen_document(&self, path: &DocumentPath, listener: DocumentListener) -> ListenerRegistration;

    /// Reads every document in `collection` once.
    fn get(&self, collection: &CollectionPath) -> Result<Vec<Document>>;

    /// Reads a single document once.
    fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>>;

    /// Commits `operations` atomically.
    ///
    /// Either every operation takes effect or none does. An empty list
    /// commits nothing and notifies nobody.
    async fn commit(&self, operations: Vec<WriteOp>) -> Result<CommitReceipt>;
}
