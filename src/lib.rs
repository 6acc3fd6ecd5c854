//! autobump - version-driven update and pull request reconciliation
//!
//! This library keeps pinned runtime versions in a repository current:
//! - probes an upstream source for newer patch releases
//! - rewrites the tracked files, scoped per `major.minor` component
//! - publishes the change as a pull request, from a fork when configured
//! - reuses, merges or supersedes pull requests that carry the same
//!   version identity

pub mod cli;
pub mod codec;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod git;
pub mod hosting;
pub mod output;
pub mod patcher;
pub mod probe;
pub mod progress;
pub mod reconcile;
