//! Larder Query - Query descriptors and evaluation for Larder.
//!
//! This crate provides the immutable query model and its in-process evaluator:
//!
//! - `ast`: Filter clause and sort key definitions
//! - `executor`: Filter, sort and limit operators over documents
//! - `Query`: The composable query descriptor
//!
//! Evaluation is pure: the same document set always yields the same ordered
//! result, whatever order the documents arrive in.

pub mod ast;
pub mod executor;
mod query;

pub use ast::{Direction, Filter, FilterOp, SortKey};
pub use query::Query;
