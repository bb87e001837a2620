//! Data store configuration.

use larder_core::{Error, Result};
use larder_reactive::{InvalidDocumentPolicy, StreamOptions};
use serde::{Deserialize, Serialize};

/// Settings applied to every stream a `DataStore` opens.
///
/// ```rust
/// use larder_database::DataStoreConfig;
/// use larder_reactive::InvalidDocumentPolicy;
///
/// let config = DataStoreConfig::from_json(r#"{ "invalid_document_policy": "terminate" }"#).unwrap();
/// assert_eq!(config.invalid_document_policy, InvalidDocumentPolicy::Terminate);
/// assert!(config.emit_initial_empty);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataStoreConfig {
    /// What streams do with documents their entity constructor rejects.
    pub invalid_document_policy: InvalidDocumentPolicy,
    /// Emit a stream's first result even when it is empty.
    pub emit_initial_empty: bool,
}

impl Default for DataStoreConfig {
    fn default() -> Self {
        Self {
            invalid_document_policy: InvalidDocumentPolicy::Skip,
            emit_initial_empty: true,
        }
    }
}

impl DataStoreConfig {
    /// Parses a JSON configuration. Missing keys take their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::config(e.to_string()))
    }

    /// Returns the stream options these settings imply.
    pub fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            invalid_documents: self.invalid_document_policy,
            emit_initial_empty: self.emit_initial_empty,
        }
    }
}
