//! Templated download locations
//!
//! A location template contains a `{version}` placeholder. Network templates
//! (`http://`, `https://`) are checked with a HEAD request; `file://` URLs and
//! plain paths are checked on the local filesystem.

use crate::error::ProbeError;
use crate::probe::{ExistenceProber, HttpClient};
use async_trait::async_trait;
use std::path::PathBuf;
use url::Url;

/// Placeholder substituted with the probed version
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Existence prober backed by a location template
pub struct TemplateLocation {
    template: String,
    client: HttpClient,
}

impl TemplateLocation {
    /// Create a prober for the given template
    pub fn new(template: impl Into<String>, client: HttpClient) -> Self {
        Self {
            template: template.into(),
            client,
        }
    }

    /// Returns true if the template points at a network location
    pub fn is_remote(&self) -> bool {
        self.template.starts_with("http://") || self.template.starts_with("https://")
    }

    fn local_path(location: &str) -> Result<PathBuf, ProbeError> {
        if location.starts_with("file://") {
            let url = Url::parse(location)
                .map_err(|e| ProbeError::network(location, format!("invalid file URL: {}", e)))?;
            url.to_file_path()
                .map_err(|_| ProbeError::network(location, "file URL has no local path"))
        } else {
            Ok(PathBuf::from(location))
        }
    }
}

#[async_trait]
impl ExistenceProber for TemplateLocation {
    fn location(&self, version: &str) -> String {
        self.template.replace(VERSION_PLACEHOLDER, version)
    }

    async fn exists(&self, version: &str) -> Result<bool, ProbeError> {
        let location = self.location(version);
        if self.is_remote() {
            self.client.exists(&location).await
        } else {
            Ok(Self::local_path(&location)?.exists())
        }
    }
}
