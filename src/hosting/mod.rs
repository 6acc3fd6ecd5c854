//! Remote hosting service integration
//!
//! The reconciler and the working copy talk to the hosting service only
//! through `RemoteHosting`, so tests can substitute an in-memory fake.

mod github;

pub use github::GitHubService;

use crate::domain::{NewPullRequest, PullRequestRecord};
use crate::error::{ConfigError, HostingError};
use async_trait::async_trait;
use std::fmt;

/// Default web host for clone URLs
pub const DEFAULT_HOST: &str = "github.com";

/// Hosting operations needed to reconcile update pull requests
#[async_trait]
pub trait RemoteHosting: Send + Sync {
    /// The primary repository all pull requests target
    fn repository(&self) -> &RepositoryRef;

    /// All open pull requests against the primary repository
    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequestRecord>, HostingError>;

    /// Open a pull request
    async fn create_pull_request(
        &self,
        request: &NewPullRequest,
    ) -> Result<PullRequestRecord, HostingError>;

    /// Merge a pull request. Returns whether the service reported it merged.
    async fn merge_pull_request(&self, number: u64) -> Result<bool, HostingError>;

    /// Close a pull request without merging
    async fn close_pull_request(&self, number: u64) -> Result<(), HostingError>;

    /// Clone URL with credentials embedded for pushing
    fn authenticated_url(&self, url: &str) -> String;
}

/// `owner/name` reference to a hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    /// Create a reference from its parts
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse an `owner/name` string
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(ConfigError::InvalidValue {
                key: "repo".to_string(),
                value: value.to_string(),
                message: "expected 'owner/name'".to_string(),
            }),
        }
    }

    /// HTTPS clone URL on the given web host
    pub fn clone_url(&self, host: &str) -> String {
        format!("https://{}/{}/{}.git", host, self.owner, self.name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
