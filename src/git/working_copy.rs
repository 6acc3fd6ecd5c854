//! Local checkout of the tracked repository
//!
//! Publishing an update walks a fixed sequence of states:
//!
//! ```text
//! WorkingCopy -> BranchCheckout -> StagedChanges -> LocalCommit -> PushedBranch
//! ```
//!
//! Each step consumes the previous state, so a commit without a branch or a
//! pull request without a push does not type-check.

use super::url::{redact, same_repository};
use super::GitExecutor;
use crate::domain::{NewPullRequest, PullRequestRecord};
use crate::error::{AppError, ConfigError, GitError, HostingError};
use crate::hosting::RemoteHosting;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const ORIGIN: &str = "origin";
const FORK: &str = "fork";

/// A fork that receives pushes in place of the primary repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkRemote {
    /// Owner (user or org) of the fork, used as the PR head prefix
    pub owner: String,
    /// Push URL, credentials included
    pub url: String,
}

/// Where and how to materialize a working copy
#[derive(Debug, Clone)]
pub struct WorkingCopySettings {
    pub path: PathBuf,
    /// Primary repository URL, credentials included
    pub origin_url: String,
    pub base_branch: String,
    pub fork: Option<ForkRemote>,
}

/// A checkout bound to one repository
pub struct WorkingCopy<'g> {
    git: &'g dyn GitExecutor,
    path: PathBuf,
    base_branch: String,
    fork: Option<ForkRemote>,
    branch: String,
}

impl<'g> WorkingCopy<'g> {
    /// Clone the repository if absent, otherwise verify and refresh it.
    ///
    /// An existing checkout whose origin names another repository is a
    /// configuration error. A matching origin with a different URL (for
    /// example a rotated token) is rewritten in place. On success the base
    /// branch is checked out at the remote tip with no local changes.
    pub fn ensure_cloned(
        git: &'g dyn GitExecutor,
        settings: WorkingCopySettings,
    ) -> Result<Self, AppError> {
        let WorkingCopySettings {
            path,
            origin_url,
            base_branch,
            fork,
        } = settings;

        if path.join(".git").exists() {
            verify_origin(git, &path, &origin_url)?;
        } else if is_non_empty_dir(&path) {
            return Err(ConfigError::InvalidValue {
                key: "path".to_string(),
                value: path.display().to_string(),
                message: "directory exists but is not a git checkout".to_string(),
            }
            .into());
        } else {
            clone_into(git, &path, &origin_url, &base_branch)?;
        }

        let wc = Self {
            git,
            path,
            branch: base_branch.clone(),
            base_branch,
            fork,
        };
        wc.configure_fork()?;
        wc.sync_base()?;
        Ok(wc)
    }

    /// Open an existing checkout as-is, without fetching or resetting
    pub fn open(git: &'g dyn GitExecutor, path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if !path.join(".git").exists() {
            return Err(ConfigError::InvalidValue {
                key: "from".to_string(),
                value: path.display().to_string(),
                message: "not a git checkout".to_string(),
            }
            .into());
        }
        let branch = git
            .run(&path, &["rev-parse", "--abbrev-ref", "HEAD"])?
            .into_iter()
            .next()
            .unwrap_or_default();
        Ok(Self {
            git,
            path,
            base_branch: branch.clone(),
            fork: None,
            branch,
        })
    }

    /// Root directory of the checkout
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_branch(&self) -> &str {
        &self.base_branch
    }

    /// Branch currently checked out
    pub fn current_branch(&self) -> &str {
        &self.branch
    }

    pub fn fork(&self) -> Option<&ForkRemote> {
        self.fork.as_ref()
    }

    /// Porcelain status lines; empty means a clean tree
    pub fn current_status(&self) -> Result<Vec<String>, GitError> {
        self.git(&["status", "--porcelain"])
    }

    /// `git show` output of one commit
    pub fn show_commit(&self, sha: &str) -> Result<Vec<String>, GitError> {
        if sha.is_empty() || sha.starts_with('-') {
            return Err(GitError::command_failed(
                format!("show {}", sha),
                "invalid revision",
            ));
        }
        self.git(&["show", "--format=medium", sha])
    }

    /// Force-create `name` at the remote base tip and check it out
    pub fn switch_or_create_branch(
        &mut self,
        name: &str,
    ) -> Result<BranchCheckout<'_, 'g>, GitError> {
        let start = format!("{}/{}", ORIGIN, self.base_branch);
        self.git(&["checkout", "-B", name, &start])?;
        self.branch = name.to_string();
        debug!(branch = name, "switched branch");
        Ok(BranchCheckout { wc: self })
    }

    fn git(&self, args: &[&str]) -> Result<Vec<String>, GitError> {
        self.git.run(&self.path, args)
    }

    fn push_remote(&self) -> &'static str {
        if self.fork.is_some() {
            FORK
        } else {
            ORIGIN
        }
    }

    fn configure_fork(&self) -> Result<(), GitError> {
        let Some(fork) = &self.fork else {
            return Ok(());
        };
        let remotes = self.git(&["remote"])?;
        if remotes.iter().any(|r| r.trim() == FORK) {
            self.git(&["remote", "set-url", FORK, &fork.url])?;
        } else {
            self.git(&["remote", "add", FORK, &fork.url])?;
        }
        debug!(owner = %fork.owner, "fork remote configured");
        Ok(())
    }

    fn sync_base(&self) -> Result<(), GitError> {
        let upstream = format!("{}/{}", ORIGIN, self.base_branch);
        self.git(&["fetch", ORIGIN, "--prune"])?;
        let leftovers = self.current_status()?;
        if !leftovers.is_empty() {
            warn!(
                path = %self.path.display(),
                entries = leftovers.len(),
                "discarding local changes left in the working copy"
            );
        }
        self.git(&["reset", "--hard"])?;
        self.git(&["clean", "-fd"])?;
        self.git(&["checkout", "-B", &self.base_branch, &upstream])?;
        self.git(&["reset", "--hard", &upstream])?;
        Ok(())
    }
}

fn is_non_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

fn verify_origin(git: &dyn GitExecutor, path: &Path, expected: &str) -> Result<(), AppError> {
    let found = git
        .run(path, &["remote", "get-url", ORIGIN])?
        .into_iter()
        .next()
        .unwrap_or_default();

    if !same_repository(&found, expected) {
        return Err(ConfigError::RepositoryMismatch {
            path: path.to_path_buf(),
            expected: redact(expected),
            found: redact(&found),
        }
        .into());
    }

    if found != expected {
        info!(path = %path.display(), "refreshing origin URL");
        git.run(path, &["remote", "set-url", ORIGIN, expected])?;
    }
    Ok(())
}

fn clone_into(
    git: &dyn GitExecutor,
    path: &Path,
    url: &str,
    base_branch: &str,
) -> Result<(), AppError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ConfigError::InvalidValue {
            key: "path".to_string(),
            value: path.display().to_string(),
            message: "path has no directory name".to_string(),
        })?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|source| GitError::Io {
        path: parent.clone(),
        source,
    })?;

    info!(path = %path.display(), url = %redact(url), "cloning");
    git.run(&parent, &["clone", "--branch", base_branch, url, &name])?;
    Ok(())
}

/// Update branch checked out and ready for patching
pub struct BranchCheckout<'a, 'g> {
    wc: &'a mut WorkingCopy<'g>,
}

impl<'a, 'g> BranchCheckout<'a, 'g> {
    /// Root directory to patch files under
    pub fn root(&self) -> &Path {
        &self.wc.path
    }

    pub fn branch(&self) -> &str {
        &self.wc.branch
    }

    /// Stage the given paths (relative to the root)
    pub fn stage(self, paths: &[PathBuf]) -> Result<StagedChanges<'a, 'g>, GitError> {
        let paths: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.wc.git(&args)?;
        Ok(StagedChanges { wc: self.wc })
    }
}

/// Changes staged on the update branch
pub struct StagedChanges<'a, 'g> {
    wc: &'a mut WorkingCopy<'g>,
}

impl<'a, 'g> StagedChanges<'a, 'g> {
    pub fn commit(self, message: &str) -> Result<LocalCommit<'a, 'g>, GitError> {
        self.wc.git(&["commit", "-m", message])?;
        Ok(LocalCommit { wc: self.wc })
    }
}

/// Update committed locally, not yet pushed
pub struct LocalCommit<'a, 'g> {
    wc: &'a mut WorkingCopy<'g>,
}

impl<'a, 'g> LocalCommit<'a, 'g> {
    /// Force-push the branch to the fork when configured, else to origin.
    ///
    /// The branch name is derived from the target versions, so a rerun
    /// replaces whatever a previous attempt pushed.
    pub fn push(self) -> Result<PushedBranch<'a, 'g>, GitError> {
        let remote = self.wc.push_remote();
        let branch = self.wc.branch.clone();
        self.wc.git(&["push", "--force", remote, &branch])?;
        info!(remote, branch = %branch, "pushed");
        Ok(PushedBranch { wc: self.wc })
    }
}

/// Update branch published on the remote
pub struct PushedBranch<'a, 'g> {
    wc: &'a mut WorkingCopy<'g>,
}

impl PushedBranch<'_, '_> {
    /// Head reference for the pull request: `fork-owner:branch` when pushed
    /// to a fork, otherwise the bare branch
    pub fn head_ref(&self) -> String {
        match &self.wc.fork {
            Some(fork) => format!("{}:{}", fork.owner, self.wc.branch),
            None => self.wc.branch.clone(),
        }
    }

    /// Open a pull request from the pushed branch into the base branch of the
    /// primary repository
    pub async fn open_pull_request(
        self,
        hosting: &dyn RemoteHosting,
        title: &str,
        body: &str,
    ) -> Result<PullRequestRecord, HostingError> {
        let request = NewPullRequest {
            head: self.head_ref(),
            base: self.wc.base_branch.clone(),
            title: title.to_string(),
            body: body.to_string(),
        };
        let pr = hosting.create_pull_request(&request).await?;
        info!(pr_number = pr.number, head = %request.head, "opened PR");
        Ok(pr)
    }
}
