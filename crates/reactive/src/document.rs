//! Live single-document streams for detail views.

use crate::observable::{decode_documents, StreamOptions, StreamStatus};
use larder_core::{Document, DocumentPath, Entity, Error, Result};
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::ops::ControlFlow;
use tracing::debug;

/// A live view of one document.
///
/// Emits `Some(entity)` whenever the document's content changes and `None`
/// when it is absent. A document rejected by its entity constructor reads as
/// absent under `InvalidDocumentPolicy::Skip`.
pub struct LiveDocument<E> {
    path: DocumentPath,
    options: StreamOptions,
    status: StreamStatus,
    current: Option<Document>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> LiveDocument<E> {
    pub fn new(path: DocumentPath) -> Self {
        Self::with_options(path, StreamOptions::default())
    }

    pub fn with_options(path: DocumentPath, options: StreamOptions) -> Self {
        Self {
            path,
            options,
            status: StreamStatus::Pending,
            current: None,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    #[inline]
    pub fn status(&self) -> StreamStatus {
        self.status
    }

    /// Processes one raw snapshot of the document.
    pub fn on_snapshot(&mut self, snapshot: &Result<Option<Document>>) -> Option<Result<Option<E>>> {
        if self.status == StreamStatus::Closed {
            return None;
        }
        let raw = match snapshot {
            Ok(raw) => raw,
            Err(err) => return Some(Err(self.on_error(err.clone()))),
        };

        let first = self.status == StreamStatus::Pending;
        if !first && *raw == self.current {
            return None;
        }

        let decoded = match raw {
            Some(doc) => {
                match decode_documents::<E>(std::slice::from_ref(doc), self.options.invalid_documents) {
                    Ok(mut entities) => entities.pop(),
                    Err(err) => return Some(Err(self.on_error(err))),
                }
            }
            None => None,
        };

        self.status = StreamStatus::Subscribed;
        self.current = raw.clone();
        if first && decoded.is_none() && !self.options.emit_initial_empty {
            return None;
        }
        debug!(path = %self.path, present = decoded.is_some(), "live document emission");
        Some(Ok(decoded))
    }

    /// Closes the stream with an error, returning it for delivery.
    pub fn on_error(&mut self, err: Error) -> Error {
        debug!(path = %self.path, error = %err, "live document closed");
        self.status = StreamStatus::Closed;
        err
    }
}

impl<E: Entity + Send + 'static> LiveDocument<E> {
    /// Adapts this live document into a store listener callback.
    pub fn into_listener<F>(
        self,
        callback: F,
    ) -> impl Fn(&Result<Option<Document>>) -> ControlFlow<()> + Send + Sync + 'static
    where
        F: Fn(Result<Option<E>>) + Send + Sync + 'static,
    {
        let state = Mutex::new(self);
        move |snapshot: &Result<Option<Document>>| {
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
    use crate::InvalidDocumentPolicy;
    use larder_core::{Fields, Identified};

    #[derive(Clone, Debug, PartialEq)]
    struct Team {
        id: String,
        name: String,
    }

    impl Identified for Team {
        fn document_id(&self) -> &str {
            &self.id
        }
    }

    impl Entity for Team {
        fn from_document(id: &str, fields: &Fields) -> Result<Self> {
            Ok(Team {
                id: id.to_string(),
                name: fields.reader(id).require_str("name")?.to_string(),
            })
        }

        fn to_fields(&self) -> Fields {
            Fields::new().with("name", self.name.as_str())
        }
    }

    fn path() -> DocumentPath {
        DocumentPath::parse("team/t1").unwrap()
    }

    fn team(name: &str) -> Option<Document> {
        Some(Document::new("t1", Fields::new().with("name", name)))
    }

    #[test]
    fn test_live_document_changes() {
        let mut live: LiveDocument<Team> = LiveDocument::new(path());

        let first = live.on_snapshot(&Ok(team("Home"))).unwrap().unwrap();
        assert_eq!(first.unwrap().name, "Home");

        assert!(live.on_snapshot(&Ok(team("Home"))).is_none());

        let renamed = live.on_snapshot(&Ok(team("Office"))).unwrap().unwrap();
        assert_eq!(renamed.unwrap().name, "Office");

        let removed = live.on_snapshot(&Ok(None)).unwrap().unwrap();
        assert!(removed.is_none());
    }

    #[test]
    fn test_live_document_initially_absent() {
        let mut live: LiveDocument<Team> = LiveDocument::new(path());
        assert_eq!(live.on_snapshot(&Ok(None)), Some(Ok(None)));

        let options = StreamOptions {
            emit_initial_empty: false,
            ..StreamOptions::default()
        };
        let mut live: LiveDocument<Team> = LiveDocument::with_options(path(), options);
        assert!(live.on_snapshot(&Ok(None)).is_none());
    }

    #[test]
    fn test_live_document_listener() {
        use std::sync::Arc;

        let seen: Arc<Mutex<Vec<Result<Option<Team>>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener = LiveDocument::<Team>::new(path())
            .into_listener(move |emission| sink.lock().push(emission));

        assert_eq!(listener(&Ok(team("Home"))), ControlFlow::Continue(()));
        assert_eq!(listener(&Ok(team("Home"))), ControlFlow::Continue(()));
        assert_eq!(listener(&Ok(None)), ControlFlow::Continue(()));
        assert_eq!(listener(&Err(Error::store("offline"))), ControlFlow::Break(()));
        assert_eq!(listener(&Ok(team("Office"))), ControlFlow::Break(()));

        let seen = seen.lock();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].as_ref().unwrap().as_ref().unwrap().name, "Home");
        assert_eq!(seen[1], Ok(None));
        assert_eq!(seen[2], Err(Error::store("offline")));
    }

    #[test]
    fn test_live_document_invalid() {
        let bad = Some(Document::new("t1", Fields::new()));

        let mut live: LiveDocument<Team> = LiveDocument::new(path());
        assert_eq!(live.on_snapshot(&Ok(bad.clone())), Some(Ok(None)));

        let options = StreamOptions {
            invalid_documents: InvalidDocumentPolicy::Terminate,
            ..StreamOptions::default()
        };
        let mut live: LiveDocument<Team> = LiveDocument::with_options(path(), options);
        assert!(matches!(live.on_snapshot(&Ok(bad)), Some(Err(Error::InvalidDataStructure { .. }))));
        assert_eq!(live.status(), StreamStatus::Closed);
    }
}
