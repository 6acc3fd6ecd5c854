//! Version string helpers
//!
//! Versions are dot-delimited numeric identifiers (`8.1.5`), optionally
//! followed by a build/date code (`8.1.5-20230315`). The component a version
//! belongs to is its `major.minor` prefix.

use std::cmp::Ordering;

/// Compare two version strings numerically, segment by segment
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse_parts = |s: &str| -> Vec<u64> {
        let s = s.strip_prefix('v').unwrap_or(s);
        s.split(['.', '-']).filter_map(|p| p.parse().ok()).collect()
    };

    let parts_a = parse_parts(a);
    let parts_b = parse_parts(b);

    for (pa, pb) in parts_a.iter().zip(parts_b.iter()) {
        match pa.cmp(pb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    // If all common parts are equal, the longer version is greater
    parts_a.len().cmp(&parts_b.len())
}

/// Increment the final dot-delimited numeric segment.
///
/// Returns `None` when the last segment is not a number.
pub fn increment_last(version: &str) -> Option<String> {
    let (head, last) = match version.rsplit_once('.') {
        Some((head, last)) => (Some(head), last),
        None => (None, version),
    };
    let next = last.parse::<u64>().ok()?.checked_add(1)?;
    Some(match head {
        Some(head) => format!("{}.{}", head, next),
        None => next.to_string(),
    })
}

/// The `major.minor` scope of a version (`8.1.5` -> `8.1`)
pub fn component_of(version: &str) -> Option<String> {
    let mut parts = version.split('.');
    let major = parts.next().filter(|p| is_numeric(p))?;
    let minor = parts.next().filter(|p| is_numeric(p))?;
    Some(format!("{}.{}", major, minor))
}

/// Split `8.1.5-20230315` into (`8.1.5`, `Some("20230315")`)
pub fn split_build(full: &str) -> (&str, Option<&str>) {
    match full.split_once('-') {
        Some((version, build)) if !build.is_empty() => (version, Some(build)),
        Some((version, _)) => (version, None),
        None => (full, None),
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
