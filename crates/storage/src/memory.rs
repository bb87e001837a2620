//! In-memory document store.
//!
//! `MemoryStore` keeps committed documents in memory and implements
//! `DocumentStore` with the full commit and notification contract. It is the
//! store used in tests and works as a local store in its own right.

use crate::batch::WriteOp;
use crate::clock::{Clock, SystemClock};
use crate::journal::{Collections, CommitJournal, CommitReceipt};
use crate::store::{
    CollectionListener, CollectionSnapshot, DocumentListener, DocumentSnapshot, DocumentStore,
    ListenerRegistration,
};
use async_trait::async_trait;
use larder_core::{CollectionPath, Document, DocumentPath, Error, Fields, Result};
use larder_reactive::SubscriptionManager;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct Inner {
    // Held across apply and notify so listeners see commits in commit order.
    commit_lock: ReentrantMutex<()>,
    state: RwLock<Collections>,
    collection_listeners: Mutex<HashMap<CollectionPath, SubscriptionManager<CollectionSnapshot>>>,
    document_listeners: Mutex<HashMap<DocumentPath, SubscriptionManager<DocumentSnapshot>>>,
    clock: Arc<dyn Clock>,
    failure: Mutex<Option<Error>>,
}

/// An in-memory `DocumentStore`.
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store stamped by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                commit_lock: ReentrantMutex::new(()),
                state: RwLock::new(Collections::new()),
                collection_listeners: Mutex::new(HashMap::new()),
                document_listeners: Mutex::new(HashMap::new()),
                clock,
                failure: Mutex::new(None),
            }),
        }
    }

    /// Returns the number of live listeners on `collection`.
    pub fn listener_count(&self, collection: &CollectionPath) -> usize {
        self.inner
            .collection_listeners
            .lock()
            .get(collection)
            .map_or(0, SubscriptionManager::len)
    }

    /// Returns the number of live listeners on the document at `path`.
    pub fn document_listener_count(&self, path: &DocumentPath) -> usize {
        self.inner
            .document_listeners
            .lock()
            .get(path)
            .map_or(0, SubscriptionManager::len)
    }

    /// Makes the next commit fail with `err` without applying anything.
    pub fn fail_next_commit(&self, err: Error) {
        *self.inner.failure.lock() = Some(err);
    }

    /// Delivers `err` to every listener on `collection`, as a transport
    /// failure would.
    pub fn deliver_error(&self, collection: &CollectionPath, err: Error) {
        let _commit = self.inner.commit_lock.lock();
        let manager = self.inner.collection_listeners.lock().get(collection).cloned();
        if let Some(manager) = manager {
            warn!(collection = %collection, error = %err, "delivering store error to listeners");
            manager.notify_all(&Err(err));
        }
    }

    fn snapshot(&self, collection: &CollectionPath) -> Vec<Document> {
        self.inner
            .state
            .read()
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, fields)| Document::new(id.as_str(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn document_snapshot(&self, path: &DocumentPath) -> Option<Document> {
        self.inner
            .state
            .read()
            .get(&path.parent())
            .and_then(|documents| documents.get(path.id()))
            .map(|fields| Document::new(path.id(), fields.clone()))
    }

    fn stage(journal: &mut CommitJournal<'_>, op: WriteOp, commit_time: i64) -> Result<()> {
        match op {
            WriteOp::Set { path, data } => {
                journal.put(path, data.resolve(commit_time));
            }
            WriteOp::Update { path, data } => {
                let mut fields = journal
                    .get(&path)
                    .cloned()
                    .ok_or_else(|| Error::document_not_found(path.to_string()))?;
                data.apply_to(&mut fields, commit_time);
                journal.put(path, fields);
            }
            WriteOp::Merge { path, data } => {
                let mut fields = journal.get(&path).cloned().unwrap_or_else(Fields::new);
                data.apply_to(&mut fields, commit_time);
                journal.put(path, fields);
            }
            WriteOp::Delete { path } => journal.remove(path),
        }
        Ok(())
    }

    fn commit_blocking(&self, operations: Vec<WriteOp>) -> Result<CommitReceipt> {
        let _commit = self.inner.commit_lock.lock();

        if let Some(err) = self.inner.failure.lock().take() {
            warn!(error = %err, operations = operations.len(), "commit failed");
            return Err(err);
        }

        let commit_time = self.inner.clock.now_millis();
        if operations.is_empty() {
            debug!("empty batch committed");
            return Ok(CommitReceipt {
                commit_time,
                events: Vec::new(),
            });
        }

        let count = operations.len();
        let staged = {
            let state = self.inner.state.read();
            let mut journal = CommitJournal::new(&state);
            for op in operations {
                let kind = op.kind();
                if let Err(err) = Self::stage(&mut journal, op, commit_time) {
                    warn!(error = %err, operation = kind, "commit rejected");
                    return Err(err);
                }
            }
            journal.finish()
        };

        let events = staged.events();
        let collections: Vec<CollectionPath> = staged.diffs().keys().cloned().collect();
        let documents = staged.affected_documents();
        staged.apply(&mut self.inner.state.write());

        info!(
            operations = count,
            changed = events.len(),
            commit_time,
            "batch committed"
        );

        for collection in &collections {
            self.notify_collection(collection);
        }
        for path in &documents {
            self.notify_document(path);
        }

        Ok(CommitReceipt {
            commit_time,
            events,
        })
    }

    fn notify_collection(&self, collection: &CollectionPath) {
        let manager = {
            let mut listeners = self.inner.collection_listeners.lock();
            listeners.retain(|_, manager| !manager.is_empty());
            listeners.get(collection).cloned()
        };
        if let Some(manager) = manager {
            manager.notify_all(&Ok(self.snapshot(collection)));
        }
    }

    fn notify_document(&self, path: &DocumentPath) {
        let manager = {
            let mut listeners = self.inner.document_listeners.lock();
            listeners.retain(|_, manager| !manager.is_empty());
            listeners.get(path).cloned()
        };
        if let Some(manager) = manager {
            manager.notify_all(&Ok(self.document_snapshot(path)));
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn listen(&self, collection: &CollectionPath, listener: CollectionListener) -> ListenerRegistration {
        // No commit may land between the initial snapshot and registration.
        let _commit = self.inner.commit_lock.lock();
        let manager = self
            .inner
            .collection_listeners
            .lock()
            .entry(collection.clone())
            .or_default()
            .clone();
        let registration = manager.subscribe(listener);
        debug!(collection = %collection, listener = registration.id(), "listener registered");
        manager.notify(registration.id(), &Ok(self.snapshot(collection)));
        registration
    }

    fn listen_document(&self, path: &DocumentPath, listener: DocumentListener) -> ListenerRegistration {
        let _commit = self.inner.commit_lock.lock();
        let manager = self
            .inner
            .document_listeners
            .lock()
            .entry(path.clone())
            .or_default()
            .clone();
        let registration = manager.subscribe(listener);
        debug!(path = %path, listener = registration.id(), "document listener registered");
        manager.notify(registration.id(), &Ok(self.document_snapshot(path)));
        registration
    }

    fn get(&self, collection: &CollectionPath) -> Result<Vec<Document>> {
        Ok(self.snapshot(collection))
    }

    fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>> {
        Ok(self.document_snapshot(path))
    }

    async fn commit(&self, operations: Vec<WriteOp>) -> Result<CommitReceipt> {
        self.commit_blocking(operations)
    }
}
