use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The values a document holds for one category, in assignment order.
///
/// Duplicate values collapse on insertion (and on deserialization), so a
/// document tagged `Invoice` twice still holds a single `Invoice`.
pub type TagSet = IndexSet<String>;

/// A tracked document and its per-category tag values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    /// `categoryId → tag values`. Categories with no values may be absent.
    #[serde(default)]
    pub tags: BTreeMap<String, TagSet>,
}

impl Evidence {
    pub fn new(id: impl Into<String>) -> Self {
        Evidence { id: id.into(), tags: BTreeMap::new() }
    }

    /// Builder-style helper that adds one tag value.
    pub fn with_tag(mut self, category_id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        self.add_tag(category_id, tag_name);
        self
    }

    pub fn add_tag(&mut self, category_id: impl Into<String>, tag_name: impl Into<String>) {
        self.tags.entry(category_id.into()).or_default().insert(tag_name.into());
    }

    /// Returns the values held for `category_id`, if any.
    pub fn tags_for(&self, category_id: &str) -> Option<&TagSet> {
        self.tags.get(category_id).filter(|set| !set.is_empty())
    }

    /// Membership test used by path filtering.
    pub fn has_tag(&self, category_id: &str, tag_name: &str) -> bool {
        self.tags
            .get(category_id)
            .is_some_and(|set| set.contains(tag_name))
    }
}

/// Identity of an evidence snapshot, used as part of the structure cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotToken {
    /// Monotonic version supplied by the data source.
    Version(u64),
    /// SHA-256 over the snapshot's content.
    Digest([u8; 32]),
}

impl fmt::Display for SnapshotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotToken::Version(v) => write!(f, "v{}", v),
            SnapshotToken::Digest(bytes) => {
                for b in &bytes[..6] {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

/// An immutable snapshot of the evidence collection.
///
/// Each refresh from the data source produces a new snapshot; previously
/// returned structures are never mutated in place. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct EvidenceSet {
    documents: Arc<[Evidence]>,
    token: SnapshotToken,
}

impl EvidenceSet {
    /// Creates a snapshot identified by a digest of its content.
    pub fn new(documents: Vec<Evidence>) -> Self {
        let token = SnapshotToken::Digest(content_digest(&documents));
        EvidenceSet { documents: documents.into(), token }
    }

    /// Creates a snapshot identified by a version number from the data source.
    ///
    /// The caller is responsible for bumping the version whenever content changes.
    pub fn with_version(documents: Vec<Evidence>, version: u64) -> Self {
        EvidenceSet { documents: documents.into(), token: SnapshotToken::Version(version) }
    }

    pub fn token(&self) -> SnapshotToken {
        self.token
    }

    pub fn documents(&self) -> &[Evidence] {
        &self.documents
    }
}

impl Deref for EvidenceSet {
    type Target = [Evidence];

    fn deref(&self) -> &[Evidence] {
        &self.documents
    }
}

impl From<Vec<Evidence>> for EvidenceSet {
    fn from(documents: Vec<Evidence>) -> Self {
        EvidenceSet::new(documents)
    }
}

fn content_digest(documents: &[Evidence]) -> [u8; 32] {
    // Unit/record separators keep ("ab","c") distinct from ("a","bc").
    let mut hasher = Sha256::new();
    for doc in documents {
        hasher.update(doc.id.as_bytes());
        hasher.update([0x1e]);
        for (category_id, values) in &doc.tags {
            hasher.update(category_id.as_bytes());
            hasher.update([0x1d]);
            for value in values {
                hasher.update(value.as_bytes());
                hasher.update([0x1f]);
            }
        }
        hasher.update([0x1c]);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_tag_values_collapse() {
        let doc = Evidence::new("d1")
            .with_tag("type", "Invoice")
            .with_tag("type", "Invoice")
            .with_tag("type", "Receipt");

        let values: Vec<&str> = doc.tags_for("type").unwrap().iter().map(String::as_str).collect();
        assert_eq!(values, vec!["Invoice", "Receipt"]);
        assert!(doc.has_tag("type", "Receipt"));
        assert!(!doc.has_tag("year", "2024"));
    }

    #[test]
    fn empty_tag_list_reads_as_untagged() {
        let json = r#"{"id":"d1","tags":{"type":[],"year":["2024","2024"]}}"#;
        let doc: Evidence = serde_json::from_str(json).unwrap();

        assert!(doc.tags_for("type").is_none());
        assert_eq!(doc.tags_for("year").unwrap().len(), 1);
    }

    #[test]
    fn digest_tracks_content() {
        let a = EvidenceSet::new(vec![Evidence::new("d1").with_tag("type", "Invoice")]);
        let b = EvidenceSet::new(vec![Evidence::new("d1").with_tag("type", "Invoice")]);
        let c = EvidenceSet::new(vec![Evidence::new("d1").with_tag("type", "Receipt")]);

        assert_eq!(a.token(), b.token());
        assert_ne!(a.token(), c.token());
        assert_eq!(EvidenceSet::with_version(Vec::new(), 7).token(), SnapshotToken::Version(7));
    }
}
