//! Limit executor.

use larder_core::Document;

/// Limit executor - keeps the first `limit` documents of a sorted result.
pub struct LimitExecutor {
    limit: Option<usize>,
}

impl LimitExecutor {
    /// Creates a new limit executor. `None` keeps everything.
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit }
    }

    /// Executes the limit on the input documents.
    pub fn execute(&self, mut input: Vec<Document>) -> Vec<Document> {
        if let Some(limit) = self.limit {
            input.truncate(limit);
        }
        input
    }
}
