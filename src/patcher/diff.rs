//! VersionUpdate recovery from a prior commit's diff
//!
//! Used to port an update already made in one working copy into another:
//! removed lines give the prior versions, added lines the targets.

use crate::domain::version::{component_of, split_build};
use crate::domain::{ComponentUpdate, VersionUpdate};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn version_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"\b\d+\.\d+\.\d+(?:-\d+)?\b").expect("version token pattern is valid")
    })
}

/// Collect `component -> full version` for every version token on the
/// diff lines carrying `marker`
fn collect(lines: &[String], marker: char, components: &[String]) -> BTreeMap<String, String> {
    let header = format!("{0}{0}{0}", marker);
    let mut found = BTreeMap::new();
    for line in lines {
        let Some(body) = line.strip_prefix(marker) else {
            continue;
        };
        if line.starts_with(&header) {
            continue;
        }
        for token in version_token().find_iter(body) {
            let full = token.as_str();
            let Some(component) = component_of(full) else {
                continue;
            };
            if !components.is_empty() && !components.contains(&component) {
                continue;
            }
            found.entry(component).or_insert_with(|| full.to_string());
        }
    }
    found
}

/// Build a VersionUpdate from `git show` output lines.
///
/// Only components listed in `components` are considered (all when empty).
/// A component whose added version equals its removed version is skipped.
pub fn parse_commit_diff(lines: &[String], components: &[String]) -> VersionUpdate {
    let removed = collect(lines, '-', components);
    let added = collect(lines, '+', components);

    added
        .into_iter()
        .filter(|(component, full)| removed.get(component) != Some(full))
        .map(|(component, full)| {
            let (version, build) = split_build(&full);
            let mut update = ComponentUpdate::new(&component, version);
            if let Some(build) = build {
                update = update.with_build(build);
            }
            if let Some(from) = removed.get(&component) {
                update = update.with_from(from);
            }
            update
        })
        .collect()
}
