//! DataStore - Main entry point for Larder.
//!
//! This module provides the `DataStore` struct which is the primary interface
//! for observing typed live collections, reading once, and writing batches
//! over an injected `DocumentStore`.

use crate::config::DataStoreConfig;
use larder_core::{CollectionPath, DocumentPath, Entity, Result};
use larder_query::Query;
use larder_reactive::{
    decode_documents, CollectionChange, LiveDocument, LiveQuery, Subscription,
};
use larder_storage::{CommitReceipt, DocumentStore, WriteBatch};
use std::sync::Arc;
use tracing::debug;

/// The main data access interface.
///
/// Cloning is cheap; clones share the store.
#[derive(Clone)]
pub struct DataStore {
    store: Arc<dyn DocumentStore>,
    config: DataStoreConfig,
}

impl DataStore {
    /// Creates a data store with default configuration.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, DataStoreConfig::default())
    }

    pub fn with_config(store: Arc<dyn DocumentStore>, config: DataStoreConfig) -> Self {
        Self { store, config }
    }

    #[inline]
    pub fn config(&self) -> &DataStoreConfig {
        &self.config
    }

    /// Returns the backing store.
    #[inline]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Observes the ordered, decoded result of `query`.
    ///
    /// `callback` first receives the current result as insertions, then one
    /// `CollectionChange` per commit that changes the result. An error ends
    /// the stream after being delivered once. Cancelling or dropping the
    /// returned handle stops delivery before it returns.
    pub fn observe<E, F>(&self, query: &Query, callback: F) -> Subscription
    where
        E: Entity + Clone + PartialEq + Send + 'static,
        F: Fn(Result<CollectionChange<E>>) + Send + Sync + 'static,
    {
        debug!(query = %query, "observing query");
        let live = LiveQuery::with_options(query.clone(), self.config.stream_options());
        self.store
            .listen(query.collection(), Box::new(live.into_listener(callback)))
    }

    /// Observes a single document; `None` when it does not exist.
    pub fn observe_document<E, F>(&self, path: &DocumentPath, callback: F) -> Subscription
    where
        E: Entity + Send + 'static,
        F: Fn(Result<Option<E>>) + Send + Sync + 'static,
    {
        debug!(path = %path, "observing document");
        let live = LiveDocument::with_options(path.clone(), self.config.stream_options());
        self.store
            .listen_document(path, Box::new(live.into_listener(callback)))
    }

    /// Reads the current result of `query` once.
    pub fn fetch<E: Entity>(&self, query: &Query) -> Result<Vec<E>> {
        let documents = self.store.get(query.collection())?;
        let evaluated = query.evaluate(&documents);
        decode_documents(&evaluated, self.config.invalid_document_policy)
    }

    /// Reads a single document once.
    pub fn fetch_document<E: Entity>(&self, path: &DocumentPath) -> Result<Option<E>> {
        match self.store.get_document(path)? {
            Some(doc) => Ok(decode_documents(
                std::slice::from_ref(&doc),
                self.config.invalid_document_policy,
            )?
            .pop()),
            None => Ok(None),
        }
    }

    /// Builds a batch with `build` and commits it atomically.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use larder_core::{CollectionPath, Fields};
    /// use larder_database::DataStore;
    /// use larder_storage::MemoryStore;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let data = DataStore::new(Arc::new(MemoryStore::new()));
    /// let items = CollectionPath::parse("team/t1/item").unwrap();
    ///
    /// let receipt = data
    ///     .write(|batch| {
    ///         batch.set(items.document(), Fields::new().with("name", "Milk"));
    ///         batch.set(items.document(), Fields::new().with("name", "Eggs"));
    ///     })
    ///     .await
    ///     .unwrap();
    /// assert_eq!(receipt.events.len(), 2);
    /// # });
    /// ```
    pub async fn write<F>(&self, build: F) -> Result<CommitReceipt>
    where
        F: FnOnce(&mut WriteBatch),
    {
        let mut batch = WriteBatch::new();
        build(&mut batch);
        self.commit(batch).await
    }

    /// Like `write`, for builders that can fail. Nothing is committed when
    /// `build` returns an error.
    pub async fn try_write<F>(&self, build: F) -> Result<CommitReceipt>
    where
        F: FnOnce(&mut WriteBatch) -> Result<()>,
    {
        let mut batch = WriteBatch::new();
        build(&mut batch)?;
        self.commit(batch).await
    }

    /// Commits a prepared batch.
    pub async fn commit(&self, batch: WriteBatch) -> Result<CommitReceipt> {
        self.store.commit(batch.into_operations()).await
    }

    /// Writes `entity` to `collection` under its own id, or a fresh one if
    /// its id is empty. Returns the document path written.
    pub async fn save<E: Entity>(&self, collection: &CollectionPath, entity: &E) -> Result<DocumentPath> {
        let path = match entity.document_id() {
            "" => collection.document(),
            id => collection.document_with_id(id)?,
        };
        let mut batch = WriteBatch::new();
        batch.set_entity(path.clone(), entity);
        self.commit(batch).await?;
        Ok(path)
    }

    /// Deletes the document at `path`.
    pub async fn delete(&self, path: &DocumentPath) -> Result<CommitReceipt> {
        let mut batch = WriteBatch::new();
        batch.delete(path.clone());
        self.commit(batch).await
    }
}
