//! Tracked file patching
//!
//! This module provides:
//! - FilePatcher for rewriting version strings in tracked files
//! - Scoped lookup of the version currently recorded for a component
//! - Dry-run mode support (no actual file modifications)
//!
//! Every substitution is scoped by the component's `major.minor` prefix, so an
//! update for `8.1` never touches an `8.2.*` or `18.1.*` entry.

mod diff;

pub use diff::parse_commit_diff;

use crate::domain::{ComponentUpdate, VersionUpdate};
use crate::error::{ConfigError, PatchError};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Regex matching any full version string within a component scope
fn scoped_regex(component: &str) -> Regex {
    let source = format!(r"\b{}\.\d+(?:-\d+)?\b", regex::escape(component));
    Regex::new(&source).expect("escaped component is a valid pattern")
}

/// First full version recorded for `component` in `content`
pub fn find_current(content: &str, component: &str) -> Option<String> {
    scoped_regex(component)
        .find(content)
        .map(|m| m.as_str().to_string())
}

/// Apply one component bump to text, returning the new text.
///
/// Only occurrences equal to the prior full version are replaced. The prior
/// version is `update.from`; text that does not contain it is returned
/// unchanged. Without a recorded `from`, the first scoped match is the prior
/// version.
pub fn patch_component(content: &str, update: &ComponentUpdate) -> String {
    let regex = scoped_regex(&update.component);
    let prior = match &update.from {
        Some(from) if regex.find_iter(content).any(|m| m.as_str() == from) => from.clone(),
        Some(_) => return content.to_string(),
        None => match regex.find(content) {
            Some(m) => m.as_str().to_string(),
            None => return content.to_string(),
        },
    };
    let replacement = update.full_version();

    regex
        .replace_all(content, |caps: &regex::Captures| {
            if caps[0] == prior {
                replacement.clone()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Patcher for tracked files that applies version updates
pub struct FilePatcher {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

impl FilePatcher {
    /// Create a new FilePatcher
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Check if this patcher is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Apply every bump to one file.
    ///
    /// Returns whether the content changed. Zero diffs is a valid outcome.
    pub fn apply(&self, path: &Path, updates: &VersionUpdate) -> Result<bool, PatchError> {
        let content = fs::read_to_string(path).map_err(|e| PatchError::read_error(path, e))?;

        let patched = updates
            .iter()
            .fold(content.clone(), |text, update| patch_component(&text, update));

        let changed = patched != content;
        debug!(path = %path.display(), changed, dry_run = self.dry_run, "patched file");

        if changed && !self.dry_run {
            fs::write(path, &patched).map_err(|e| PatchError::write_error(path, e))?;
        }
        Ok(changed)
    }

    /// Apply updates to every tracked file under `root`, returning the
    /// relative paths that changed
    pub fn apply_all(
        &self,
        root: &Path,
        files: &[PathBuf],
        updates: &VersionUpdate,
    ) -> Result<Vec<PathBuf>, PatchError> {
        let mut changed = Vec::new();
        for file in files {
            if self.apply(&root.join(file), updates)? {
                changed.push(file.clone());
            }
        }
        Ok(changed)
    }
}

/// Read the currently recorded full version of each component.
///
/// The first tracked file that mentions a component wins. A component that
/// no file mentions is a configuration error.
pub fn current_versions(
    root: &Path,
    files: &[PathBuf],
    components: &[String],
) -> Result<BTreeMap<String, String>, crate::error::AppError> {
    let mut contents = Vec::with_capacity(files.len());
    for file in files {
        let path = root.join(file);
        let content = fs::read_to_string(&path).map_err(|e| PatchError::read_error(&path, e))?;
        contents.push(content);
    }

    let mut found = BTreeMap::new();
    for component in components {
        let current = contents
            .iter()
            .find_map(|content| find_current(content, component))
            .ok_or_else(|| ConfigError::UntrackedComponent {
                component: component.clone(),
            })?;
        found.insert(component.clone(), current);
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PHP_VERSIONS: &str = "versions = [\n  '8.1.3-20230101',\n  '8.2.3-20230101',\n]\n";

    fn bump(component: &str, version: &str, build: &str) -> VersionUpdate {
        let mut update = VersionUpdate::new();
        update.insert(ComponentUpdate::new(component, version).with_build(build));
        update
    }

    #[test]
    fn test_find_current() {
        assert_eq!(
            find_current(PHP_VERSIONS, "8.2").as_deref(),
            Some("8.2.3-20230101")
        );
        assert!(find_current(PHP_VERSIONS, "7.4").is_none());
    }

    #[test]
    fn test_find_current_respects_scope_boundaries() {
        let content = "18.1.4 8.10.2 8.1.7";
        assert_eq!(find_current(content, "8.1").as_deref(), Some("8.1.7"));
    }

    #[test]
    fn test_patch_component_only_touches_scope() {
        let update = ComponentUpdate::new("8.1", "8.1.5").with_build("20230315");
        let patched = patch_component(PHP_VERSIONS, &update);
        assert!(patched.contains("'8.1.5-20230315'"));
        assert!(patched.contains("'8.2.3-20230101'"));
        assert!(!patched.contains("8.1.3"));
    }

    #[test]
    fn test_patch_component_keeps_unrelated_same_minor_entries() {
        let content = "current: 8.1.3\nprevious: 8.1.2\n";
        let update = ComponentUpdate::new("8.1", "8.1.5").with_from("8.1.3");
        let patched = patch_component(content, &update);
        assert_eq!(patched, "current: 8.1.5\nprevious: 8.1.2\n");
    }

    #[test]
    fn test_patch_component_missing_prior_version_is_noop() {
        let content = "# previous release: 8.1.2\n";
        let update = ComponentUpdate::new("8.1", "8.1.5").with_from("8.1.3");
        assert_eq!(patch_component(content, &update), content);
    }

    #[test]
    fn test_apply_all_skips_files_without_prior_version() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("versions.rb"), "php '8.1.3'\n").unwrap();
        fs::write(dir.path().join("CHANGELOG"), "8.1.2: security fixes\n").unwrap();

        let mut update = VersionUpdate::new();
        update.insert(ComponentUpdate::new("8.1", "8.1.5").with_from("8.1.3"));
        let changed = FilePatcher::new(false)
            .apply_all(
                dir.path(),
                &[PathBuf::from("versions.rb"), PathBuf::from("CHANGELOG")],
                &update,
            )
            .unwrap();

        assert_eq!(changed, vec![PathBuf::from("versions.rb")]);
        assert_eq!(
            fs::read_to_string(dir.path().join("CHANGELOG")).unwrap(),
            "8.1.2: security fixes\n"
        );
    }

    #[test]
    fn test_patch_component_without_match_is_noop() {
        let update = ComponentUpdate::new("7.4", "7.4.33");
        assert_eq!(patch_component(PHP_VERSIONS, &update), PHP_VERSIONS);
    }

    #[test]
    fn test_apply_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("versions.rb");
        fs::write(&path, PHP_VERSIONS).unwrap();

        let patcher = FilePatcher::new(false);
        assert!(patcher.apply(&path, &bump("8.1", "8.1.5", "20230315")).unwrap());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("'8.1.5-20230315'"));
        assert!(content.contains("'8.2.3-20230101'"));
    }

    #[test]
    fn test_apply_already_current_reports_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("versions.rb");
        fs::write(&path, PHP_VERSIONS).unwrap();

        let patcher = FilePatcher::new(false);
        let changed = patcher
            .apply(&path, &bump("8.2", "8.2.3", "20230101"))
            .unwrap();
        assert!(!changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), PHP_VERSIONS);
    }

    #[test]
    fn test_apply_dry_run_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("versions.rb");
        fs::write(&path, PHP_VERSIONS).unwrap();

        let patcher = FilePatcher::new(true);
        assert!(patcher.is_dry_run());
        assert!(patcher.apply(&path, &bump("8.1", "8.1.5", "20230315")).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), PHP_VERSIONS);
    }

    #[test]
    fn test_apply_missing_file() {
        let dir = TempDir::new().unwrap();
        let patcher = FilePatcher::new(false);
        let err = patcher
            .apply(&dir.path().join("missing"), &VersionUpdate::new())
            .unwrap_err();
        assert!(matches!(err, PatchError::ReadError { .. }));
    }

    #[test]
    fn test_apply_all_reports_changed_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "php 8.1.3\n").unwrap();
        fs::write(dir.path().join("b.txt"), "php 8.2.3\n").unwrap();

        let patcher = FilePatcher::new(false);
        let mut update = VersionUpdate::new();
        update.insert(ComponentUpdate::new("8.1", "8.1.4"));
        let changed = patcher
            .apply_all(
                dir.path(),
                &[PathBuf::from("a.txt"), PathBuf::from("b.txt")],
                &update,
            )
            .unwrap();
        assert_eq!(changed, vec![PathBuf::from("a.txt")]);
    }

    #[test]
    fn test_current_versions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("versions.rb"), PHP_VERSIONS).unwrap();

        let found = current_versions(
            dir.path(),
            &[PathBuf::from("versions.rb")],
            &["8.1".to_string(), "8.2".to_string()],
        )
        .unwrap();
        assert_eq!(found["8.1"], "8.1.3-20230101");
        assert_eq!(found["8.2"], "8.2.3-20230101");
    }

    #[test]
    fn test_current_versions_untracked_component() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("versions.rb"), PHP_VERSIONS).unwrap();

        let err = current_versions(
            dir.path(),
            &[PathBuf::from("versions.rb")],
            &["7.4".to_string()],
        )
        .unwrap_err();
        assert!(err.to_string().contains("component '7.4' not found"));
    }
}
