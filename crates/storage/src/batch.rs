//! Write batches.
//!
//! A batch is an ordered list of document writes the store commits
//! atomically. Field values in writes may be placeholders the store resolves
//! at commit time.

use larder_core::{DocumentPath, Entity, Fields, Value};
use std::collections::btree_map::{self, BTreeMap};

/// A field value in a write.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteValue {
    /// A concrete value.
    Value(Value),
    /// Resolves to the commit time.
    ServerTimestamp,
    /// Removes the field. Dropped from `set` data.
    Delete,
}

macro_rules! write_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for WriteValue {
                fn from(v: $ty) -> Self {
                    WriteValue::Value(v.into())
                }
            }
        )*
    };
}

write_value_from!(Value, bool, i32, i64, u32, f64, String, &str, Fields);

impl<T: Into<Value>> From<Option<T>> for WriteValue {
    fn from(v: Option<T>) -> Self {
        WriteValue::Value(v.into())
    }
}

/// Field data of a write, possibly containing placeholders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteData(BTreeMap<String, WriteValue>);

impl WriteData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this data with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<WriteValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns this data with `key` set to the commit time.
    pub fn server_timestamp(self, key: impl Into<String>) -> Self {
        self.with(key, WriteValue::ServerTimestamp)
    }

    /// Returns this data with `key` marked for removal.
    pub fn delete(self, key: impl Into<String>) -> Self {
        self.with(key, WriteValue::Delete)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<WriteValue>) {
        self.0.insert(key.into(), value.into());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, WriteValue> {
        self.0.iter()
    }

    /// Resolves placeholders into a full replacement mapping.
    pub fn resolve(self, commit_time: i64) -> Fields {
        let mut fields = Fields::new();
        self.apply_to(&mut fields, commit_time);
        fields
    }

    /// Applies this data onto existing fields: values and timestamps
    /// overwrite, `Delete` removes.
    pub fn apply_to(self, fields: &mut Fields, commit_time: i64) {
        for (key, value) in self.0 {
            match value {
                WriteValue::Value(v) => {
                    fields.insert(key, v);
                }
                WriteValue::ServerTimestamp => {
                    fields.insert(key, Value::timestamp(commit_time));
                }
                WriteValue::Delete => {
                    fields.remove(&key);
                }
            }
        }
    }
}

impl From<Fields> for WriteData {
    fn from(fields: Fields) -> Self {
        Self(
            fields
                .into_iter()
                .map(|(k, v)| (k, WriteValue::Value(v)))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<WriteValue>> FromIterator<(K, V)> for WriteData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One write in a batch.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteOp {
    /// Replaces the whole document, creating it if absent.
    Set { path: DocumentPath, data: WriteData },
    /// Changes the named fields of an existing document.
    Update { path: DocumentPath, data: WriteData },
    /// Creates the document or shallow-merges into it.
    Merge { path: DocumentPath, data: WriteData },
    /// Removes the document; a no-op when absent.
    Delete { path: DocumentPath },
}

impl WriteOp {
    /// Returns the target document path.
    pub fn path(&self) -> &DocumentPath {
        match self {
            WriteOp::Set { path, .. } => path,
            WriteOp::Update { path, .. } => path,
            WriteOp::Merge { path, .. } => path,
            WriteOp::Delete { path } => path,
        }
    }

    /// Returns a short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            WriteOp::Set { .. } => "set",
            WriteOp::Update { .. } => "update",
            WriteOp::Merge { .. } => "merge",
            WriteOp::Delete { .. } => "delete",
        }
    }
}

/// An ordered set of writes committed atomically.
///
/// # Example
///
/// ```rust
/// use larder_core::CollectionPath;
/// use larder_storage::{WriteBatch, WriteData};
///
/// let items = CollectionPath::parse("team/t1/item").unwrap();
/// let mut batch = WriteBatch::new();
/// batch
///     .set(items.document(), WriteData::new().with("name", "Milk").server_timestamp("created"))
///     .delete(items.document_with_id("old").unwrap());
/// assert_eq!(batch.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteBatch {
    operations: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the document at `path` with `data`.
    pub fn set(&mut self, path: DocumentPath, data: impl Into<WriteData>) -> &mut Self {
        self.operations.push(WriteOp::Set {
            path,
            data: data.into(),
        });
        self
    }

    /// Replaces the document at `path` with an entity's fields.
    pub fn set_entity<E: Entity>(&mut self, path: DocumentPath, entity: &E) -> &mut Self {
        self.set(path, entity.to_fields())
    }

    /// Updates fields of the existing document at `path`.
    ///
    /// The commit fails with `DocumentNotFound` if the document is absent.
    pub fn update(&mut self, path: DocumentPath, data: impl Into<WriteData>) -> &mut Self {
        self.operations.push(WriteOp::Update {
            path,
            data: data.into(),
        });
        self
    }

    /// Shallow-merges `data` into the document at `path`, creating it if absent.
    pub fn merge(&mut self, path: DocumentPath, data: impl Into<WriteData>) -> &mut Self {
        self.operations.push(WriteOp::Merge {
            path,
            data: data.into(),
        });
        self
    }

    /// Deletes the document at `path`.
    pub fn delete(&mut self, path: DocumentPath) -> &mut Self {
        self.operations.push(WriteOp::Delete { path });
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[WriteOp] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<WriteOp> {
        self.operations
    }
}
