//! Commit journal.
//!
//! A `CommitJournal` stages the writes of one batch over a read-only view of
//! the committed state. Reads see earlier writes of the same batch; nothing
//! reaches the committed state until the whole batch has been staged, so a
//! failing operation leaves the store untouched.

use larder_core::{CollectionPath, DocumentPath, Fields};
use std::collections::BTreeMap;

/// Committed documents, by collection and document id.
pub type Collections = BTreeMap<CollectionPath, BTreeMap<String, Fields>>;

/// A document-level change recorded by a commit.
#[derive(Clone, Debug, PartialEq)]
pub enum DocumentEvent {
    /// The document did not exist before the commit.
    Added { path: DocumentPath, fields: Fields },
    /// The document's fields changed.
    Modified {
        path: DocumentPath,
        before: Fields,
        after: Fields,
    },
    /// The document was deleted.
    Removed { path: DocumentPath, fields: Fields },
}

impl DocumentEvent {
    /// Returns the document path for this event.
    pub fn path(&self) -> &DocumentPath {
        match self {
            DocumentEvent::Added { path, .. } => path,
            DocumentEvent::Modified { path, .. } => path,
            DocumentEvent::Removed { path, .. } => path,
        }
    }
}

/// Net changes to one collection within a commit.
///
/// Successive writes to the same document coalesce: add then delete cancels
/// out, delete then add becomes a modification, and a modification that
/// restores the original fields disappears.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollectionDiff {
    added: BTreeMap<String, Fields>,
    modified: BTreeMap<String, (Fields, Fields)>,
    removed: BTreeMap<String, Fields>,
}

impl CollectionDiff {
    /// Records an addition.
    pub fn add(&mut self, id: &str, fields: Fields) {
        if let Some(old) = self.removed.remove(id) {
            if old != fields {
                self.modified.insert(id.to_string(), (old, fields));
            }
        } else {
            self.added.insert(id.to_string(), fields);
        }
    }

    /// Records a modification.
    pub fn modify(&mut self, id: &str, old: Fields, new: Fields) {
        if let Some(added) = self.added.get_mut(id) {
            *added = new;
            return;
        }
        let original = match self.modified.remove(id) {
            Some((original, _)) => original,
            None => old,
        };
        if original != new {
            self.modified.insert(id.to_string(), (original, new));
        }
    }

    /// Records a deletion.
    pub fn delete(&mut self, id: &str, fields: Fields) {
        if self.added.remove(id).is_some() {
            return;
        }
        match self.modified.remove(id) {
            Some((original, _)) => self.removed.insert(id.to_string(), original),
            None => self.removed.insert(id.to_string(), fields),
        };
    }

    pub fn added(&self) -> &BTreeMap<String, Fields> {
        &self.added
    }

    pub fn modified(&self) -> &BTreeMap<String, (Fields, Fields)> {
        &self.modified
    }

    pub fn removed(&self) -> &BTreeMap<String, Fields> {
        &self.removed
    }

    /// Returns true if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Returns the ids of every changed document.
    pub fn document_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.added
            .keys()
            .chain(self.modified.keys())
            .chain(self.removed.keys())
            .map(String::as_str)
    }

    /// Converts to document events: additions, then modifications, then removals.
    pub fn events(&self, collection: &CollectionPath) -> Vec<DocumentEvent> {
        let path = |id: &str| DocumentPath::from_parts(collection, id);
        let mut events = Vec::with_capacity(self.added.len() + self.modified.len() + self.removed.len());

        for (id, fields) in &self.added {
            events.push(DocumentEvent::Added {
                path: path(id),
                fields: fields.clone(),
            });
        }
        for (id, (before, after)) in &self.modified {
            events.push(DocumentEvent::Modified {
                path: path(id),
                before: before.clone(),
                after: after.clone(),
            });
        }
        for (id, fields) in &self.removed {
            events.push(DocumentEvent::Removed {
                path: path(id),
                fields: fields.clone(),
            });
        }
        events
    }
}

/// Outcome of a successful commit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommitReceipt {
    /// Commit time in Unix milliseconds; server timestamps resolved to it.
    pub commit_time: i64,
    /// Net document changes, grouped by collection.
    pub events: Vec<DocumentEvent>,
}

impl CommitReceipt {
    /// Returns true if the commit changed nothing.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Stages the writes of one batch over the committed state.
pub struct CommitJournal<'a> {
    base: &'a Collections,
    staged: BTreeMap<DocumentPath, Option<Fields>>,
    diffs: BTreeMap<CollectionPath, CollectionDiff>,
}

impl<'a> CommitJournal<'a> {
    /// Creates an empty journal over `base`.
    pub fn new(base: &'a Collections) -> Self {
        Self {
            base,
            staged: BTreeMap::new(),
            diffs: BTreeMap::new(),
        }
    }

    /// Reads a document as the batch currently sees it.
    pub fn get(&self, path: &DocumentPath) -> Option<&Fields> {
        match self.staged.get(path) {
            Some(staged) => staged.as_ref(),
            None => self
                .base
                .get(&path.parent())
                .and_then(|collection| collection.get(path.id())),
        }
    }

    /// Stages a full replacement of the document at `path`.
    pub fn put(&mut self, path: DocumentPath, fields: Fields) {
        let old = self.get(&path).cloned();
        let diff = self.diffs.entry(path.parent()).or_default();
        match old {
            Some(old) => diff.modify(path.id(), old, fields.clone()),
            None => diff.add(path.id(), fields.clone()),
        }
        self.staged.insert(path, Some(fields));
    }

    /// Stages removal of the document at `path`. Absent documents are ignored.
    pub fn remove(&mut self, path: DocumentPath) {
        if let Some(old) = self.get(&path).cloned() {
            self.diffs
                .entry(path.parent())
                .or_default()
                .delete(path.id(), old);
            self.staged.insert(path, None);
        }
    }

    /// Returns true if nothing has been staged.
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Ends staging, releasing the borrow of the committed state.
    pub fn finish(self) -> StagedCommit {
        StagedCommit {
            writes: self.staged,
            diffs: self
                .diffs
                .into_iter()
                .filter(|(_, diff)| !diff.is_empty())
                .collect(),
        }
    }
}

/// Staged writes ready to be applied.
#[derive(Debug, Default)]
pub struct StagedCommit {
    writes: BTreeMap<DocumentPath, Option<Fields>>,
    diffs: BTreeMap<CollectionPath, CollectionDiff>,
}

impl StagedCommit {
    /// Returns the net changes per affected collection.
    pub fn diffs(&self) -> &BTreeMap<CollectionPath, CollectionDiff> {
        &self.diffs
    }

    /// Returns every affected document path.
    pub fn affected_documents(&self) -> Vec<DocumentPath> {
        self.diffs
            .iter()
            .flat_map(|(collection, diff)| {
                diff.document_ids()
                    .map(move |id| DocumentPath::from_parts(collection, id))
            })
            .collect()
    }

    /// Returns the document events in collection order.
    pub fn events(&self) -> Vec<DocumentEvent> {
        self.diffs
            .iter()
            .flat_map(|(collection, diff)| diff.events(collection))
            .collect()
    }

    /// Writes the staged documents into `state`.
    pub fn apply(self, state: &mut Collections) {
        for (path, write) in self.writes {
            let collection = path.parent();
            match write {
                Some(fields) => {
                    state
                        .entry(collection)
                        .or_default()
                        .insert(path.id().to_string(), fields);
                }
                None => {
                    if let Some(documents) = state.get_mut(&collection) {
                        documents.remove(path.id());
                        if documents.is_empty() {
                            state.remove(&collection);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(id: &str) -> DocumentPath {
        DocumentPath::parse(&format!("item/{}", id)).unwrap()
    }

    fn fields(n: i64) -> Fields {
        Fields::new().with("n", n)
    }

    fn base() -> Collections {
        let mut state = Collections::new();
        state
            .entry(CollectionPath::new("item").unwrap())
            .or_default()
            .insert("a".into(), fields(1));
        state
    }

    #[test]
    fn test_diff_coalescing() {
        let mut diff = CollectionDiff::default();
        diff.add("x", fields(1));
        diff.delete("x", fields(1));
        assert!(diff.is_empty());

        diff.delete("y", fields(1));
        diff.add("y", fields(2));
        assert_eq!(diff.modified().get("y"), Some(&(fields(1), fields(2))));

        diff.modify("y", fields(2), fields(1));
        assert!(diff.is_empty());

        diff.add("z", fields(1));
        diff.modify("z", fields(1), fields(5));
        assert_eq!(diff.added().get("z"), Some(&fields(5)));
    }

    #[test]
    fn test_journal_reads_own_writes() {
        let state = base();
        let mut journal = CommitJournal::new(&state);
        assert_eq!(journal.get(&path("a")), Some(&fields(1)));
        assert_eq!(journal.get(&path("b")), None);

        journal.put(path("b"), fields(2));
        journal.remove(path("a"));
        assert_eq!(journal.get(&path("b")), Some(&fields(2)));
        assert_eq!(journal.get(&path("a")), None);
        // Base is untouched until applied.
        assert_eq!(state.values().next().unwrap().len(), 1);
    }

    #[test]
    fn test_staged_commit_apply() {
        let mut state = base();
        let staged = {
            let mut journal = CommitJournal::new(&state);
            journal.put(path("a"), fields(10));
            journal.put(path("b"), fields(2));
            journal.remove(path("missing"));
            journal.finish()
        };

        let events = staged.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], DocumentEvent::Added { path, .. } if path.id() == "b"));
        assert!(matches!(&events[1], DocumentEvent::Modified { after, .. } if *after == fields(10)));
        assert_eq!(staged.affected_documents().len(), 2);

        staged.apply(&mut state);
        let items = &state[&CollectionPath::new("item").unwrap()];
        assert_eq!(items.get("a"), Some(&fields(10)));
        assert_eq!(items.get("b"), Some(&fields(2)));
    }

    #[test]
    fn test_removing_last_document_drops_collection() {
        let mut state = base();
        let staged = {
            let mut journal = CommitJournal::new(&state);
            journal.remove(path("a"));
            journal.finish()
        };
        assert!(matches!(&staged.events()[0], DocumentEvent::Removed { .. }));
        staged.apply(&mut state);
        assert!(state.is_empty());
    }

    #[test]
    fn test_noop_rewrite_has_no_diff() {
        let state = base();
        let mut journal = CommitJournal::new(&state);
        journal.put(path("a"), fields(1));
        assert!(!journal.is_empty());
        assert!(journal.finish().diffs().is_empty());
    }
}
