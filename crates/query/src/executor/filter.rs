//! Filter executor.

use crate::ast::Filter;
use larder_core::Document;

/// Filter executor - retains documents satisfying every clause.
///
/// Clauses form a conjunction, so their order never changes the result.
pub struct FilterExecutor<'a> {
    filters: &'a [Filter],
}

impl<'a> FilterExecutor<'a> {
    /// Creates a new filter executor.
    pub fn new(filters: &'a [Filter]) -> Self {
        Self { filters }
    }

    /// Returns true if the document satisfies every clause.
    #[inline]
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.eval(doc))
    }

    /// Executes the filter, cloning matching documents out of the input.
    pub fn execute<'d, I>(&self, input: I) -> Vec<Document>
    where
        I: IntoIterator<Item = &'d Document>,
    {
        input
            .into_iter()
            .filter(|doc| self.matches(doc))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::Fields;

    fn docs() -> Vec<Document> {
        vec![
            Document::new("d1", Fields::new().with("int", 42).with("tag", "a")),
            Document::new("d2", Fields::new().with("int", 80).with("tag", "b")),
            Document::new("d3", Fields::new().with("int", 21).with("tag", "a")),
        ]
    }

    #[test]
    fn test_filter_executor() {
        let filters = vec![Filter::eq("tag", "a")];
        let result = FilterExecutor::new(&filters).execute(&docs());
        let ids: Vec<_> = result.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["d1", "d3"]);
    }

    #[test]
    fn test_filter_conjunction_order_insensitive() {
        let a = vec![Filter::eq("tag", "a"), Filter::gt("int", 30)];
        let b = vec![Filter::gt("int", 30), Filter::eq("tag", "a")];
        let input = docs();
        assert_eq!(
            FilterExecutor::new(&a).execute(&input),
            FilterExecutor::new(&b).execute(&input)
        );
        assert_eq!(FilterExecutor::new(&a).execute(&input).len(), 1);
    }

    #[test]
    fn test_filter_no_clauses() {
        let result = FilterExecutor::new(&[]).execute(&docs());
        assert_eq!(result.len(), 3);
    }
}
