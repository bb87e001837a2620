//! Immutable query descriptors.
//!
//! A `Query` is a plain value: a collection path, a conjunction of filter
//! clauses, an ordered list of sort keys and an optional limit. Every builder
//! method returns a new query and leaves the receiver untouched.

use crate::ast::{Direction, Filter, FilterOp, SortKey};
use crate::executor::{FilterExecutor, LimitExecutor, SortExecutor};
use core::cmp::Ordering;
use core::fmt;
use larder_core::{CollectionPath, Document, Value};

/// Description of a collection read.
///
/// # Example
///
/// ```rust
/// use larder_core::{CollectionPath, Document, Fields};
/// use larder_query::{Direction, FilterOp, Query};
///
/// let items = CollectionPath::new("item").unwrap();
/// let base = Query::new(items);
/// let cheap = base
///     .where_field("price", FilterOp::Le, 3)
///     .order_by("name", Direction::Ascending);
///
/// assert!(base.filters().is_empty());
/// assert_eq!(cheap.filters().len(), 1);
///
/// let docs = vec![
///     Document::new("a", Fields::new().with("price", 5).with("name", "Cheese")),
///     Document::new("b", Fields::new().with("price", 2).with("name", "Bread")),
/// ];
/// let result = cheap.evaluate(&docs);
/// assert_eq!(result.len(), 1);
/// assert_eq!(result[0].id(), "b");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Query {
    collection: CollectionPath,
    filters: Vec<Filter>,
    order: Vec<SortKey>,
    limit: Option<usize>,
}

impl Query {
    /// Creates a query returning every document of `collection`, ordered by id.
    pub fn new(collection: CollectionPath) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Returns a new query with an additional filter clause.
    pub fn where_field(
        &self,
        field: impl Into<String>,
        op: FilterOp,
        operand: impl Into<Value>,
    ) -> Query {
        self.filter(Filter::new(field, op, operand))
    }

    /// Returns a new query with an additional, prebuilt filter clause.
    pub fn filter(&self, filter: Filter) -> Query {
        let mut next = self.clone();
        next.filters.push(filter);
        next
    }

    /// Returns a new query with an additional sort key.
    ///
    /// Later keys only break ties left by earlier ones.
    pub fn order_by(&self, field: impl Into<String>, direction: Direction) -> Query {
        let mut next = self.clone();
        next.order.push(SortKey::new(field, direction));
        next
    }

    /// Returns a new query keeping only the first `limit` sorted documents.
    pub fn limit(&self, limit: usize) -> Query {
        let mut next = self.clone();
        next.limit = Some(limit);
        next
    }

    #[inline]
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    #[inline]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    #[inline]
    pub fn order(&self) -> &[SortKey] {
        &self.order
    }

    #[inline]
    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    /// Returns true if the document satisfies every filter clause.
    pub fn matches(&self, doc: &Document) -> bool {
        FilterExecutor::new(&self.filters).matches(doc)
    }

    /// Compares two documents by the sort keys, then by id.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        SortExecutor::new(&self.order).compare(a, b)
    }

    /// Evaluates the query against an unordered document set.
    ///
    /// Filters, sorts and truncates; the output is fully determined by the
    /// input set, independent of input order.
    pub fn evaluate<'d, I>(&self, docs: I) -> Vec<Document>
    where
        I: IntoIterator<Item = &'d Document>,
    {
        let filtered = FilterExecutor::new(&self.filters).execute(docs);
        let sorted = SortExecutor::new(&self.order).execute(filtered);
        LimitExecutor::new(self.limit).execute(sorted)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection)?;
        for (i, filter) in self.filters.iter().enumerate() {
            f.write_str(if i == 0 { " where " } else { " and " })?;
            write!(f, "{}", filter)?;
        }
        for (i, key) in self.order.iter().enumerate() {
            f.write_str(if i == 0 { " order by " } else { ", " })?;
            write!(f, "{}", key)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " limit {}", limit)?;
        }
        Ok(())
    }
}
