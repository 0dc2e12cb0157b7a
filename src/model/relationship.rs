//! Directed relationships between components.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Identifier SPDX reserves for the document itself.
pub const SPDX_DOCUMENT_ID: &str = "SPDXRef-DOCUMENT";

pub const DEPENDS_ON: &str = "DEPENDS_ON";
pub const DESCRIBES: &str = "DESCRIBES";

/// One outgoing edge. The source is the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub other_uid: String,
    pub relationship_type: String,
    pub comment: Option<String>,
}

impl Relationship {
    #[must_use]
    pub fn new(other_uid: impl Into<String>, relationship_type: impl Into<String>) -> Self {
        Self {
            other_uid: other_uid.into(),
            relationship_type: relationship_type.into(),
            comment: None,
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Relationship multimap: source uid to the set of its outgoing edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipMap(BTreeMap<String, BTreeSet<Relationship>>);

impl RelationshipMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge. Returns false if the identical edge was already present.
    pub fn add(&mut self, source: impl Into<String>, relationship: Relationship) -> bool {
        self.0.entry(source.into()).or_default().insert(relationship)
    }

    /// Outgoing edges of `source`.
    pub fn get(&self, source: &str) -> Option<&BTreeSet<Relationship>> {
        self.0.get(source)
    }

    /// Remove one edge, dropping the source entry once it has no edges left.
    pub fn remove(&mut self, source: &str, relationship: &Relationship) -> bool {
        let Some(edges) = self.0.get_mut(source) else {
            return false;
        };
        let removed = edges.remove(relationship);
        if edges.is_empty() {
            self.0.remove(source);
        }
        removed
    }

    /// Sources with their edge sets, in uid order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<Relationship>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every edge as a `(source, relationship)` pair.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &Relationship)> {
        self.0
            .iter()
            .flat_map(|(source, rels)| rels.iter().map(move |r| (source.as_str(), r)))
    }

    /// Total number of edges.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
