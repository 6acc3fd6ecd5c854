//! Component -> target version mapping for one run

use super::version::compare_versions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single component bump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentUpdate {
    /// `major.minor` scope, e.g. `8.1`
    pub component: String,
    /// Full version string currently recorded, if known (`8.1.3-20230101`)
    pub from: Option<String>,
    /// Target version (`8.1.5`)
    pub version: String,
    /// Auxiliary build/date code appended as `-<build>`
    pub build: Option<String>,
}

impl ComponentUpdate {
    /// Create a new component update
    pub fn new(component: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            from: None,
            version: version.into(),
            build: None,
        }
    }

    /// Set the previously recorded full version
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set the build/date code
    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }

    /// Full version string written to tracked files
    pub fn full_version(&self) -> String {
        match &self.build {
            Some(build) => format!("{}-{}", self.version, build),
            None => self.version.clone(),
        }
    }
}

impl fmt::Display for ComponentUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.from {
            Some(from) => write!(f, "{}: {} -> {}", self.component, from, self.full_version()),
            None => write!(f, "{}: {}", self.component, self.full_version()),
        }
    }
}

/// The set of component bumps a run intends to apply.
///
/// Empty means there is nothing to do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionUpdate {
    entries: BTreeMap<String, ComponentUpdate>,
}

impl VersionUpdate {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the bump for a component
    pub fn insert(&mut self, update: ComponentUpdate) {
        self.entries.insert(update.component.clone(), update);
    }

    /// Returns true if nothing changes
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of components touched
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up the bump for a component
    pub fn get(&self, component: &str) -> Option<&ComponentUpdate> {
        self.entries.get(component)
    }

    /// Iterate bumps ordered by component
    pub fn iter(&self) -> impl Iterator<Item = &ComponentUpdate> {
        self.entries.values()
    }

    /// Target versions in ascending version order
    pub fn sorted_versions(&self) -> Vec<&str> {
        let mut versions: Vec<&str> = self.entries.values().map(|u| u.version.as_str()).collect();
        versions.sort_by(|a, b| compare_versions(a, b));
        versions
    }

    /// Deterministic branch name: prefix followed by the sorted target versions
    pub fn branch_name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.sorted_versions().join("-"))
    }
}

impl FromIterator<ComponentUpdate> for VersionUpdate {
    fn from_iter<I: IntoIterator<Item = ComponentUpdate>>(iter: I) -> Self {
        let mut update = VersionUpdate::new();
        for entry in iter {
            update.insert(entry);
        }
        update
    }
}
