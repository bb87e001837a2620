//! AST module for query filter and order clauses.

mod order;
mod predicate;

pub use order::{Direction, SortKey};
pub use predicate::{Filter, FilterOp};
