//! Query executor module.

mod filter;
mod limit;
mod sort;

pub use filter::FilterExecutor;
pub use limit::LimitExecutor;
pub use sort::SortExecutor;
