//! Pull request records as seen from the remote hosting service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pull request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrState {
    /// Open
    Open,
    /// Closed without merging
    Closed,
    /// Merged
    Merged,
}

/// Aggregate CI/check status of a pull request head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// All checks finished successfully, or none are configured
    Passing,
    /// At least one check is still running
    Pending,
    /// At least one check failed
    Failing,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Passing => write!(f, "passing"),
            CheckStatus::Pending => write!(f, "pending"),
            CheckStatus::Failing => write!(f, "failing"),
        }
    }
}

/// An open or closed pull request.
///
/// Owned by the hosting service; the engine only reads these and requests
/// merge/close transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    /// PR number
    pub number: u64,
    /// Head branch name
    pub branch: String,
    /// Owner of the head repository (the fork org when pushed from a fork)
    pub head_owner: String,
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
    /// Lifecycle state
    pub state: PrState,
    /// CI/check status of the head commit
    pub checks: CheckStatus,
    /// Web URL
    pub html_url: String,
}

impl PullRequestRecord {
    /// Returns true if the PR is open
    pub fn is_open(&self) -> bool {
        self.state == PrState::Open
    }

    /// Head reference in `owner:branch` form
    pub fn head_ref(&self) -> String {
        format!("{}:{}", self.head_owner, self.branch)
    }
}

/// Parameters for opening a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Head reference: `branch`, or `fork-org:branch` when pushing from a fork
    pub head: String,
    /// Base branch on the primary repository
    pub base: String,
    /// Title
    pub title: String,
    /// Body
    pub body: String,
}
