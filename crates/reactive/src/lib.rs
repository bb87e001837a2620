//! Larder Reactive - Live query diffing for Larder.
//!
//! This crate turns the snapshots a document store delivers for a live query
//! into ordered, minimal change descriptions a UI list can replay.
//!
//! # Core Concepts
//!
//! - `diff`: Positional delta between two ordered results, keyed by document id
//! - `CollectionChange`: A new result plus the deletions, insertions and
//!   modifications that produce it from the previous one
//! - `LiveQuery` / `LiveDocument`: Per-subscription state machines that
//!   evaluate, decode and diff incoming snapshots
//! - `SubscriptionManager`: Callback registry with synchronous cancellation
//!
//! # Example
//!
//! ```rust
//! use larder_reactive::{diff, CollectionChange};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Row(&'static str);
//!
//! impl larder_core::Identified for Row {
//!     fn document_id(&self) -> &str { self.0 }
//! }
//!
//! let previous = vec![Row("d3"), Row("d1"), Row("d2")];
//! let next = vec![Row("d3"), Row("new"), Row("d1"), Row("d2")];
//!
//! let change = CollectionChange::from_diff(next.clone(), diff(&previous, &next).unwrap());
//! assert_eq!(change.insertions(), &[1]);
//! assert!(change.modifications().is_empty());
//! assert_eq!(change.apply(&previous).unwrap(), next);
//! ```

pub mod change_set;
pub mod diff;
pub mod document;
pub mod observable;
pub mod subscription;

pub use change_set::CollectionChange;
pub use diff::{diff, diff_by, Diff};
pub use document::LiveDocument;
pub use observable::{decode_documents, InvalidDocumentPolicy, LiveQuery, StreamOptions, StreamStatus};
pub use subscription::{ChangeCallback, Subscription, SubscriptionId, SubscriptionManager};
