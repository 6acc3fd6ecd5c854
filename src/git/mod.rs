//! Git integration for the tracked working copy
//!
//! This module provides:
//! - The `GitExecutor` seam over git command execution
//! - `SystemGit`, which runs the installed git binary
//! - `WorkingCopy` and its ordered clone -> branch -> stage -> commit -> push
//!   -> pull request sequence
//! - Credential-safe URL helpers

mod url;
mod working_copy;

pub use self::url::{redact, same_repository, strip_credentials, with_token};
pub use working_copy::{
    BranchCheckout, ForkRemote, LocalCommit, PushedBranch, StagedChanges, WorkingCopy,
    WorkingCopySettings,
};

use crate::error::GitError;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Trait for running git commands
pub trait GitExecutor: Send + Sync {
    /// Run git with `args` inside `dir`, returning stdout as lines.
    ///
    /// A non-zero exit status is an error.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<Vec<String>, GitError>;
}

impl<T: GitExecutor + ?Sized> GitExecutor for &T {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<Vec<String>, GitError> {
        (**self).run(dir, args)
    }
}

/// Default executor that runs the system git binary
#[derive(Debug, Default, Clone)]
pub struct SystemGit {
    author_name: Option<String>,
    author_email: Option<String>,
}

impl SystemGit {
    /// Create a new system git executor
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit as the given identity instead of the ambient git config
    pub fn with_author(mut self, name: Option<String>, email: Option<String>) -> Self {
        self.author_name = name;
        self.author_email = email;
        self
    }

    fn identity_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(name) = &self.author_name {
            args.push("-c".to_string());
            args.push(format!("user.name={}", name));
        }
        if let Some(email) = &self.author_email {
            args.push("-c".to_string());
            args.push(format!("user.email={}", email));
        }
        args
    }
}

impl GitExecutor for SystemGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<Vec<String>, GitError> {
        let command = redact(&args.join(" "));
        debug!(dir = %dir.display(), %command, "git");

        let output = Command::new("git")
            .current_dir(dir)
            .args(self.identity_args())
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| GitError::Spawn {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::command_failed(command, redact(stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(String::from)
            .collect())
    }
}
