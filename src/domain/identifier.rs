//! Structured "which versions does this change touch" identity
//!
//! Identifiers are never stored. They are recovered from commit messages and
//! pull request text by the codec and compared with set semantics.

use serde::Serialize;
use std::collections::BTreeMap;

/// Result of comparing two identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMatch {
    /// Same components with the same versions
    Equivalent,
    /// At least one shared component, versions or component sets differ
    Overlapping,
    /// No component in common
    Disjoint,
}

/// Set of `(component, version)` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionIdentifier {
    entries: BTreeMap<String, String>,
}

impl VersionIdentifier {
    /// Create an empty identifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a component version, replacing any previous one
    pub fn insert(&mut self, component: impl Into<String>, version: impl Into<String>) {
        self.entries.insert(component.into(), version.into());
    }

    /// Returns true if no pair was recovered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Version recorded for a component
    pub fn get(&self, component: &str) -> Option<&str> {
        self.entries.get(component).map(String::as_str)
    }

    /// Iterate pairs ordered by component
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    /// Compare against another identifier.
    ///
    /// An empty identifier matches nothing, not even another empty one.
    pub fn matches(&self, other: &VersionIdentifier) -> IdentityMatch {
        if self.is_empty() || other.is_empty() {
            return IdentityMatch::Disjoint;
        }
        if self.entries == other.entries {
            return IdentityMatch::Equivalent;
        }
        if self.entries.keys().any(|c| other.entries.contains_key(c)) {
            IdentityMatch::Overlapping
        } else {
            IdentityMatch::Disjoint
        }
    }
}

impl<C: Into<String>, V: Into<String>> FromIterator<(C, V)> for VersionIdentifier {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut id = VersionIdentifier::new();
        for (component, version) in iter {
            id.insert(component, version);
        }
        id
    }
}
