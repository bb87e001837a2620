//! Collection and document addressing.
//!
//! A path is an alternating sequence of collection-name and document-id
//! segments: `/team/{teamID}/item/{itemID}`. Collection paths have an odd
//! number of segments, document paths an even number. Parsing normalizes
//! leading, trailing and repeated slashes, so equal logical paths compare and
//! hash equal however they were built.

use crate::error::{Error, Result};
use core::fmt;
use core::str::FromStr;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated document identifiers.
pub const AUTO_ID_LEN: usize = 20;

/// Generates a fresh random alphanumeric document identifier.
pub fn auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}

fn split(raw: &str) -> Vec<String> {
    raw.split('/')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn check_segment(context: &dyn fmt::Display, segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(Error::invalid_path(context.to_string(), "empty segment"));
    }
    if segment.contains('/') {
        return Err(Error::invalid_path(
            context.to_string(),
            format!("segment {:?} contains '/'", segment),
        ));
    }
    Ok(())
}

fn write_segments(f: &mut fmt::Formatter<'_>, segments: &[String]) -> fmt::Result {
    for segment in segments {
        write!(f, "/{}", segment)?;
    }
    Ok(())
}

/// Path to a collection of documents.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// Creates a path to a root-level collection.
    pub fn new(name: &str) -> Result<Self> {
        check_segment(&name, name)?;
        Ok(Self {
            segments: vec![name.to_string()],
        })
    }

    /// Parses a `/`-separated collection path.
    pub fn parse(raw: &str) -> Result<Self> {
        let segments = split(raw);
        if segments.len() % 2 == 0 {
            return Err(Error::invalid_path(
                raw,
                "collection paths need an odd number of segments",
            ));
        }
        Ok(Self { segments })
    }

    /// Returns the collection name (last segment).
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Returns all segments.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the owning document, or None for a root collection.
    pub fn parent(&self) -> Option<DocumentPath> {
        if self.segments.len() < 3 {
            return None;
        }
        Some(DocumentPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Derives a document path with a fresh auto-generated identifier.
    pub fn document(&self) -> DocumentPath {
        let mut segments = self.segments.clone();
        segments.push(auto_id());
        DocumentPath { segments }
    }

    /// Derives a document path with an explicit identifier.
    pub fn document_with_id(&self, id: &str) -> Result<DocumentPath> {
        check_segment(self, id)?;
        let mut segments = self.segments.clone();
        segments.push(id.to_string());
        Ok(DocumentPath { segments })
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_segments(f, &self.segments)
    }
}

impl FromStr for CollectionPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Path to a single document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    /// Joins a collection path and an id that is already known to be a
    /// valid segment, such as one read back from a stored document.
    pub fn from_parts(collection: &CollectionPath, id: &str) -> Self {
        let mut segments = collection.segments.clone();
        segments.push(id.to_string());
        Self { segments }
    }

    /// Parses a `/`-separated document path.
    pub fn parse(raw: &str) -> Result<Self> {
        let segments = split(raw);
        if segments.is_empty() || segments.len() % 2 != 0 {
            return Err(Error::invalid_path(
                raw,
                "document paths need a non-zero even number of segments",
            ));
        }
        Ok(Self { segments })
    }

    /// Returns the document identifier (last segment).
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Returns all segments.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the collection containing this document.
    pub fn parent(&self) -> CollectionPath {
        CollectionPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        }
    }

    /// Derives a child collection path below this document.
    pub fn collection(&self, name: &str) -> Result<CollectionPath> {
        check_segment(self, name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(CollectionPath { segments })
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_segments(f, &self.segments)
    }
}

impl FromStr for DocumentPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_collection_path_parse() {
        let path = CollectionPath::parse("team/t1/item").unwrap();
        assert_eq!(path.id(), "item");
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.to_string(), "/team/t1/item");
        assert!(CollectionPath::parse("team/t1").is_err());
        assert!(CollectionPath::parse("").is_err());
    }

    #[test]
    fn test_document_path_parse() {
        let path: DocumentPath = "/team/t1/item/i9".parse().unwrap();
        assert_eq!(path.id(), "i9");
        assert_eq!(path.parent().to_string(), "/team/t1/item");
        assert!(DocumentPath::parse("team").is_err());
        assert!(DocumentPath::parse("/").is_err());
    }

    #[test]
    fn test_paths_equal_regardless_of_construction() {
        let built = CollectionPath::new("team")
            .unwrap()
            .document_with_id("t1")
            .unwrap()
            .collection("item")
            .unwrap();
        let parsed = CollectionPath::parse("//team/t1//item/").unwrap();
        assert_eq!(built, parsed);

        let mut set = HashSet::new();
        set.insert(built);
        assert!(set.contains(&parsed));
    }

    #[test]
    fn test_auto_id_documents() {
        let items = CollectionPath::new("item").unwrap();
        let a = items.document();
        let b = items.document();
        assert_eq!(a.id().len(), AUTO_ID_LEN);
        assert!(a.id().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
        assert_eq!(a.parent(), items);
    }

    #[test]
    fn test_invalid_segments() {
        let items = CollectionPath::new("item").unwrap();
        assert!(items.document_with_id("").is_err());
        assert!(items.document_with_id("a/b").is_err());
        assert!(CollectionPath::new("a/b").is_err());
    }

    #[test]
    fn test_collection_parent() {
        let root = CollectionPath::new("team").unwrap();
        assert_eq!(root.parent(), None);

        let nested = CollectionPath::parse("team/t1/member").unwrap();
        assert_eq!(nested.parent().unwrap().to_string(), "/team/t1");
    }
}
