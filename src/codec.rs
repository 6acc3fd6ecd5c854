//! VersionIdentifier codec
//!
//! Renders `(component, version)` pairs into free text and recovers them
//! again. Two templates drive it, both using `#` as a numeric placeholder:
//! - the value-id template names the component (`php-#.#` -> `php-8.1`)
//! - the version-value template carries the remaining version digits
//!   (`.#` -> `.5`)
//!
//! Decoding scans for the value-id template with any trailing version value,
//! so the surrounding prose of a commit message or PR title can change
//! between runs without changing the recovered identity.

use crate::domain::{IdentityMatch, VersionIdentifier, VersionUpdate};
use crate::error::ConfigError;
use regex::Regex;

/// Placeholder character in templates
const PLACEHOLDER: char = '#';

/// Default value-id template
pub const DEFAULT_VALUE_ID: &str = "php-#.#";

/// Default version-value template.
///
/// Together with the value-id template it bounds how many version segments
/// an identifier can carry: three with the defaults. Longer versions are
/// rejected rather than truncated, since truncation would make `8.1.5.1` and
/// `8.1.5.2` indistinguishable.
pub const DEFAULT_VERSION_VALUE: &str = ".#";

/// Encoder/decoder for version identifiers
#[derive(Debug, Clone)]
pub struct IdentifierCodec {
    value_id: String,
    version_value: String,
    component_slots: usize,
    value_slots: usize,
    regex: Regex,
}

impl IdentifierCodec {
    /// Compile a codec from its two templates
    pub fn new(value_id: &str, version_value: &str) -> Result<Self, ConfigError> {
        let component_slots = value_id.matches(PLACEHOLDER).count();
        if component_slots == 0 {
            return Err(ConfigError::invalid_pattern(
                value_id,
                "value-id template needs at least one '#'",
            ));
        }
        let value_slots = version_value.matches(PLACEHOLDER).count();

        let mut source = String::new();
        if value_id.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
            source.push_str(r"\b");
        }
        source.push_str(&template_to_regex(value_id));
        if value_slots > 0 {
            source.push_str(&format!("(?:{})?", template_to_regex(version_value)));
        }

        let regex = Regex::new(&source)
            .map_err(|e| ConfigError::invalid_pattern(value_id, e.to_string()))?;

        Ok(Self {
            value_id: value_id.to_string(),
            version_value: version_value.to_string(),
            component_slots,
            value_slots,
            regex,
        })
    }

    /// Most version segments one identifier can carry
    pub fn max_segments(&self) -> usize {
        self.component_slots + self.value_slots
    }

    /// Render one version as its canonical identifier substring.
    ///
    /// Fails when the version has more segments than the templates have
    /// placeholders.
    pub fn render(&self, version: &str) -> Result<String, ConfigError> {
        let count = version.split('.').count();
        if count > self.max_segments() {
            return Err(ConfigError::InvalidValue {
                key: "identifier".to_string(),
                value: version.to_string(),
                message: format!(
                    "templates '{}' + '{}' carry at most {} version segments",
                    self.value_id,
                    self.version_value,
                    self.max_segments()
                ),
            });
        }

        let mut segments = version.split('.');
        let mut out = fill(&self.value_id, &mut segments);
        let rest: Vec<&str> = segments.collect();
        if self.value_slots > 0 && !rest.is_empty() {
            out.push_str(&fill(&self.version_value, &mut rest.into_iter()));
        }
        Ok(out)
    }

    /// Compose a message: preamble followed by every rendered identifier
    pub fn encode(&self, preamble: &str, updates: &VersionUpdate) -> Result<String, ConfigError> {
        let rendered = updates
            .sorted_versions()
            .into_iter()
            .map(|v| self.render(v))
            .collect::<Result<Vec<_>, _>>()?;

        let list = match rendered.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [init @ .., last] => format!("{} and {}", init.join(", "), last),
        };

        Ok(if preamble.is_empty() {
            list
        } else {
            format!("{} {}", preamble.trim_end(), list)
        })
    }

    /// Recover every `(component, version)` pair mentioned in `text`
    pub fn decode(&self, text: &str) -> VersionIdentifier {
        let mut id = VersionIdentifier::new();
        for caps in self.regex.captures_iter(text) {
            let numbers: Vec<&str> = caps
                .iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str())
                .collect();
            if numbers.len() < self.component_slots {
                continue;
            }
            let component = numbers[..self.component_slots].join(".");
            let version = numbers.join(".");
            id.insert(component, version);
        }
        id
    }

    /// Identifier a freshly composed update would carry
    pub fn identify(&self, updates: &VersionUpdate) -> Result<VersionIdentifier, ConfigError> {
        Ok(self.decode(&self.encode("", updates)?))
    }

    /// Compare two identifiers
    pub fn matches(&self, a: &VersionIdentifier, b: &VersionIdentifier) -> IdentityMatch {
        a.matches(b)
    }

    /// Value-id template this codec was built from
    pub fn value_id(&self) -> &str {
        &self.value_id
    }
}

/// Escape literal text and turn each placeholder into a numeric capture
fn template_to_regex(template: &str) -> String {
    template
        .split(PLACEHOLDER)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"(\d+)")
}

/// Substitute placeholders in order from `segments`.
///
/// Rendering stops before the first placeholder with no segment left.
fn fill<'a>(template: &str, segments: &mut impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    let mut parts = template.split(PLACEHOLDER).peekable();
    while let Some(literal) = parts.next() {
        out.push_str(literal);
        if parts.peek().is_none() {
            break;
        }
        match segments.next() {
            Some(segment) => out.push_str(segment),
            None => break,
        }
    }
    out
}
