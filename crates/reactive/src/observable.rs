//! Live query result streams.
//!
//! `LiveQuery` turns the raw snapshots a store delivers for one collection
//! into `CollectionChange`s: each snapshot is evaluated against the query,
//! decoded into entities and diffed against the previously emitted result.
//! It is a plain state machine; `into_listener` adapts it into a store
//! listener callback.

use crate::change_set::CollectionChange;
use crate::diff::diff;
use larder_core::{Document, Entity, Error, Result};
use larder_query::Query;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use tracing::{debug, warn};

/// What a live stream does with a document its entity constructor rejects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidDocumentPolicy {
    /// Drop the document, log it and keep streaming the rest.
    #[default]
    Skip,
    /// Deliver the error once and end the stream.
    Terminate,
}

/// Behavior switches for live streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamOptions {
    pub invalid_documents: InvalidDocumentPolicy,
    /// Emit the first result even when it is empty.
    pub emit_initial_empty: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            invalid_documents: InvalidDocumentPolicy::Skip,
            emit_initial_empty: true,
        }
    }
}

/// Lifecycle of a live stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamStatus {
    /// No snapshot seen yet.
    Pending,
    /// At least one snapshot seen; the baseline is the last emitted result.
    Subscribed,
    /// Ended by an error; no further emissions.
    Closed,
}

/// Decodes documents into entities, applying the invalid document policy.
///
/// Under `Skip` rejected documents are logged and left out; under
/// `Terminate` the first rejection is returned.
pub fn decode_documents<E: Entity>(
    documents: &[Document],
    policy: InvalidDocumentPolicy,
) -> Result<Vec<E>> {
    let mut entities = Vec::with_capacity(documents.len());
    for doc in documents {
        match doc.decode::<E>() {
            Ok(entity) => entities.push(entity),
            Err(err) if policy == InvalidDocumentPolicy::Skip => {
                warn!(document = doc.id(), error = %err, "skipping invalid document");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(entities)
}

/// A live query over one collection.
///
/// # Example
///
/// ```rust
/// use larder_core::{CollectionPath, Document, Entity, Fields, Identified, Result};
/// use larder_query::{Direction, Query};
/// use larder_reactive::LiveQuery;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Item { id: String, count: i64 }
///
/// impl Identified for Item {
///     fn document_id(&self) -> &str { &self.id }
/// }
///
/// impl Entity for Item {
///     fn from_document(id: &str, fields: &Fields) -> Result<Self> {
///         let count = fields.reader(id).require_i64("count")?;
///         Ok(Item { id: id.to_string(), count })
///     }
///     fn to_fields(&self) -> Fields { Fields::new().with("count", self.count) }
/// }
///
/// let query = Query::new(CollectionPath::new("item").unwrap())
///     .order_by("count", Direction::Ascending);
/// let mut live: LiveQuery<Item> = LiveQuery::new(query);
///
/// let snapshot = vec![
///     Document::new("a", Fields::new().with("count", 2)),
///     Document::new("b", Fields::new().with("count", 1)),
/// ];
/// let change = live.on_snapshot(&Ok(snapshot)).unwrap().unwrap();
/// assert_eq!(change.insertions(), &[0, 1]);
/// assert_eq!(change.result()[0].id, "b");
/// ```
pub struct LiveQuery<E> {
    query: Query,
    options: StreamOptions,
    status: StreamStatus,
    documents: Vec<Document>,
    entities: Vec<E>,
}

impl<E> LiveQuery<E>
where
    E: Entity + Clone + PartialEq,
{
    /// Creates a live query with default options.
    pub fn new(query: Query) -> Self {
        Self::with_options(query, StreamOptions::default())
    }

    pub fn with_options(query: Query, options: StreamOptions) -> Self {
        Self {
            query,
            options,
            status: StreamStatus::Pending,
            documents: Vec::new(),
            entities: Vec::new(),
        }
    }

    #[inline]
    pub fn query(&self) -> &Query {
        &self.query
    }

    #[inline]
    pub fn status(&self) -> StreamStatus {
        self.status
    }

    /// Returns the last emitted result.
    #[inline]
    pub fn result(&self) -> &[E] {
        &self.entities
    }

    /// Processes one raw snapshot of the query's collection.
    ///
    /// Returns `None` when nothing is to be emitted: the stream is closed, the
    /// evaluated result is unchanged, or the initial result is empty and
    /// `emit_initial_empty` is off. An `Err` closes the stream.
    pub fn on_snapshot(
        &mut self,
        snapshot: &Result<Vec<Document>>,
    ) -> Option<Result<CollectionChange<E>>> {
        if self.status == StreamStatus::Closed {
            return None;
        }
        let raw = match snapshot {
            Ok(raw) => raw,
            Err(err) => return Some(Err(self.on_error(err.clone()))),
        };

        let evaluated = self.query.evaluate(raw);
        let first = self.status == StreamStatus::Pending;
        if !first && evaluated == self.documents {
            return None;
        }

        let entities = match decode_documents::<E>(&evaluated, self.options.invalid_documents) {
            Ok(entities) => entities,
            Err(err) => return Some(Err(self.on_error(err))),
        };
        let delta = match diff(&self.entities, &entities) {
            Ok(delta) => delta,
            Err(err) => return Some(Err(self.on_error(err))),
        };

        self.status = StreamStatus::Subscribed;
        self.documents = evaluated;
        self.entities = entities;

        let silent = if first {
            self.entities.is_empty() && !self.options.emit_initial_empty
        } else {
            delta.is_empty()
        };
        if silent {
            return None;
        }

        debug!(
            query = %self.query,
            deletions = delta.deletions.len(),
            insertions = delta.insertions.len(),
            modifications = delta.modifications.len(),
            "live query emission"
        );
        Some(Ok(CollectionChange::from_diff(self.entities.clone(), delta)))
    }

    /// Closes the stream with an error, returning it for delivery.
    pub fn on_error(&mut self, err: Error) -> Error {
        debug!(query = %self.query, error = %err, "live query closed");
        self.close();
        err
    }

    /// Closes the stream; later snapshots are ignored.
    pub fn close(&mut self) {
        self.status = StreamStatus::Closed;
    }
}

impl<E> LiveQuery<E>
where
    E: Entity + Clone + PartialEq + Send + 'static,
{
    /// Adapts this live query into a store listener callback.
    ///
    /// `callback` receives every emission. The listener asks the store to end
    /// the registration once the stream closes.
    pub fn into_listener<F>(
        self,
        callback: F,
    ) -> impl Fn(&Result<Vec<Document>>) -> ControlFlow<()> + Send + Sync + 'static
    where
        F: Fn(Result<CollectionChange<E>>) + Send + Sync + 'static,
    {
        let state = Mutex::new(self);
        move |snapshot: &Result<Vec<Document>>| {
            let (emission, closed) = {
                let mut live = state.lock();
                let emission = live.on_snapshot(snapshot);
                (emission, live.status() == StreamStatus::Closed)
            };
            if let Some(emission) = emission {
                callback(emission);
            }
            if closed {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::{CollectionPath, Fields, Identified};
    use larder_query::{Direction, FilterOp};

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        id: String,
        int: i64,
    }

    impl Identified for Item {
        fn document_id(&self) -> &str {
            &self.id
        }
    }

    impl Entity for Item {
        fn from_document(id: &str, fields: &Fields) -> Result<Self> {
            let int = fields.reader(id).require_i64("int")?;
            Ok(Item {
                id: id.to_string(),
                int,
            })
        }

        fn to_fields(&self) -> Fields {
            Fields::new().with("int", self.int)
        }
    }

    fn doc(id: &str, int: i64) -> Document {
        Document::new(id, Fields::new().with("int", int))
    }

    fn by_int() -> Query {
        Query::new(CollectionPath::new("item").unwrap()).order_by("int", Direction::Ascending)
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn base() -> Vec<Document> {
        vec![doc("d1", 42), doc("d2", 80), doc("d3", 21)]
    }

    #[test]
    fn test_first_snapshot_is_all_insertions() {
        let mut live: LiveQuery<Item> = LiveQuery::new(by_int());
        assert_eq!(live.status(), StreamStatus::Pending);

        let change = live.on_snapshot(&Ok(base())).unwrap().unwrap();
        assert_eq!(ids(change.result()), vec!["d3", "d1", "d2"]);
        assert_eq!(change.insertions(), &[0, 1, 2]);
        assert!(change.deletions().is_empty());
        assert!(change.modifications().is_empty());
        assert_eq!(live.status(), StreamStatus::Subscribed);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut live: LiveQuery<Item> = LiveQuery::new(by_int());
        live.on_snapshot(&Ok(base()));

        let mut next = base();
        next.push(doc("newDoc", 30));
        let change = live.on_snapshot(&Ok(next)).unwrap().unwrap();
        assert_eq!(ids(change.result()), vec!["d3", "newDoc", "d1", "d2"]);
        assert_eq!(change.insertions(), &[1]);
        assert!(change.deletions().is_empty());
        assert!(change.modifications().is_empty());
    }

    #[test]
    fn test_batched_delete() {
        let mut live: LiveQuery<Item> = LiveQuery::new(by_int());
        live.on_snapshot(&Ok(base()));

        let change = live.on_snapshot(&Ok(vec![doc("d1", 42)])).unwrap().unwrap();
        assert_eq!(ids(change.result()), vec!["d1"]);
        assert_eq!(change.deletions(), &[0, 2]);
        assert!(change.insertions().is_empty());
    }

    #[test]
    fn test_unchanged_snapshot_emits_nothing() {
        let mut live: LiveQuery<Item> = LiveQuery::new(by_int());
        live.on_snapshot(&Ok(base()));
        assert!(live.on_snapshot(&Ok(base())).is_none());

        // A change outside the filtered result is invisible too.
        let query = by_int().where_field("int", FilterOp::Lt, 50);
        let mut live: LiveQuery<Item> = LiveQuery::new(query);
        live.on_snapshot(&Ok(base()));
        let mut next = base();
        next[1] = doc("d2", 90);
        assert!(live.on_snapshot(&Ok(next)).is_none());
    }

    #[test]
    fn test_emit_initial_empty() {
        let mut live: LiveQuery<Item> = LiveQuery::new(by_int());
        let change = live.on_snapshot(&Ok(Vec::new())).unwrap().unwrap();
        assert!(change.is_empty());

        let options = StreamOptions {
            emit_initial_empty: false,
            ..StreamOptions::default()
        };
        let mut live: LiveQuery<Item> = LiveQuery::with_options(by_int(), options);
        assert!(live.on_snapshot(&Ok(Vec::new())).is_none());
        assert_eq!(live.status(), StreamStatus::Subscribed);

        let change = live.on_snapshot(&Ok(vec![doc("d1", 1)])).unwrap().unwrap();
        assert_eq!(change.insertions(), &[0]);
    }

    #[test]
    fn test_invalid_document_skipped() {
        let mut live: LiveQuery<Item> = LiveQuery::new(by_int());
        let mut snapshot = base();
        snapshot.push(Document::new("bad", Fields::new().with("int", "nope")));

        let change = live.on_snapshot(&Ok(snapshot)).unwrap().unwrap();
        assert_eq!(ids(change.result()), vec!["d3", "d1", "d2"]);
        assert_eq!(live.status(), StreamStatus::Subscribed);
    }

    #[test]
    fn test_invalid_document_terminates() {
        let options = StreamOptions {
            invalid_documents: InvalidDocumentPolicy::Terminate,
            ..StreamOptions::default()
        };
        let mut live: LiveQuery<Item> = LiveQuery::with_options(by_int(), options);
        let snapshot = vec![doc("d1", 1), Document::new("bad", Fields::new())];

        let err = live.on_snapshot(&Ok(snapshot)).unwrap().unwrap_err();
        assert!(matches!(err, Error::InvalidDataStructure { ref document, .. } if document == "bad"));
        assert_eq!(live.status(), StreamStatus::Closed);
        assert!(live.on_snapshot(&Ok(base())).is_none());
    }

    #[test]
    fn test_store_error_closes_stream() {
        let mut live: LiveQuery<Item> = LiveQuery::new(by_int());
        live.on_snapshot(&Ok(base()));

        let err = live.on_snapshot(&Err(Error::store("offline"))).unwrap().unwrap_err();
        assert_eq!(err, Error::store("offline"));
        assert!(live.on_snapshot(&Ok(Vec::new())).is_none());
        assert_eq!(ids(live.result()), vec!["d3", "d1", "d2"]);
    }

    #[test]
    fn test_listener_breaks_after_close() {
        use std::sync::Arc;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener = LiveQuery::<Item>::new(by_int()).into_listener(move |emission| {
            sink.lock().push(emission.is_ok());
        });

        assert!(listener(&Ok(base())).is_continue());
        assert!(listener(&Err(Error::store("gone"))).is_break());
        assert_eq!(*seen.lock(), vec![true, false]);
    }

    #[test]
    fn test_policy_serde() {
        let policy: InvalidDocumentPolicy = serde_json::from_str("\"terminate\"").unwrap();
        assert_eq!(policy, InvalidDocumentPolicy::Terminate);
        assert_eq!(serde_json::to_string(&InvalidDocumentPolicy::Skip).unwrap(), "\"skip\"");
    }
}
