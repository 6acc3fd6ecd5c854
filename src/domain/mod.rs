//! Core domain models for autobump
//!
//! This module contains the fundamental types used throughout the application:
//! - Version string helpers
//! - VersionUpdate: what a run intends to change
//! - VersionIdentifier: the identity of a change recovered from free text
//! - Pull request records
//! - The terminal decision of a run

mod decision;
mod identifier;
mod pull_request;
pub mod version;
mod version_update;

pub use decision::UpdateDecision;
pub use identifier::{IdentityMatch, VersionIdentifier};
pub use pull_request::{CheckStatus, NewPullRequest, PrState, PullRequestRecord};
pub use version_update::{ComponentUpdate, VersionUpdate};
