//! Sort executor.

use crate::ast::SortKey;
use core::cmp::Ordering;
use larder_core::Document;

/// Sort executor - orders documents by successive sort keys.
///
/// Keys are applied left to right, each breaking ties left by the previous
/// ones. Remaining ties fall back to document id ascending, so the order is
/// total and repeatable.
pub struct SortExecutor<'a> {
    keys: &'a [SortKey],
}

impl<'a> SortExecutor<'a> {
    /// Creates a new sort executor.
    pub fn new(keys: &'a [SortKey]) -> Self {
        Self { keys }
    }

    /// Compares two documents under the sort keys and the id tie-break.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for key in self.keys {
            let cmp = a.value(&key.field).cmp(b.value(&key.field));
            if cmp != Ordering::Equal {
                return key.direction.apply(cmp);
            }
        }
        a.id().cmp(b.id())
    }

    /// Executes the sort on the input documents.
    pub fn execute(&self, mut input: Vec<Document>) -> Vec<Document> {
        input.sort_by(|a, b| self.compare(a, b));
        input
    }
}
