//! Pull request reconciliation
//!
//! Decides whether an update is already represented by an open pull request,
//! and closes or merges the pull requests it overlaps with.

use crate::codec::IdentifierCodec;
use crate::domain::{CheckStatus, IdentityMatch, PullRequestRecord, VersionIdentifier};
use crate::error::HostingError;
use crate::hosting::RemoteHosting;
use tracing::{debug, info, warn};

/// Open pull requests relevant to a target identifier
#[derive(Debug, Clone, Default)]
pub struct PrScan {
    /// PRs carrying an identifier equivalent to the target
    pub equivalent: Vec<PullRequestRecord>,
    /// PRs that share a component with the target but are not equivalent
    pub superseded: Vec<PullRequestRecord>,
}

impl PrScan {
    /// Whether at least one open PR already represents the target
    pub fn matched(&self) -> bool {
        !self.equivalent.is_empty()
    }

    /// Equivalent PR numbers in listing order
    pub fn equivalent_numbers(&self) -> Vec<u64> {
        self.equivalent.iter().map(|pr| pr.number).collect()
    }

    /// Superseded PR numbers in listing order
    pub fn superseded_numbers(&self) -> Vec<u64> {
        self.superseded.iter().map(|pr| pr.number).collect()
    }
}

/// Result of a merge attempt over several PRs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: Vec<u64>,
    /// PRs left open because checks are pending or failing, or the service
    /// declined the merge
    pub waiting: Vec<u64>,
}

impl MergeOutcome {
    /// True when every candidate was merged
    pub fn all_merged(&self) -> bool {
        self.waiting.is_empty()
    }
}

/// Matches update identifiers against open PRs and acts on the matches
pub struct PrReconciler<'a> {
    hosting: &'a dyn RemoteHosting,
    codec: &'a IdentifierCodec,
    dry_run: bool,
}

impl<'a> PrReconciler<'a> {
    pub fn new(hosting: &'a dyn RemoteHosting, codec: &'a IdentifierCodec, dry_run: bool) -> Self {
        Self {
            hosting,
            codec,
            dry_run,
        }
    }

    /// Identifier carried by a PR: decoded from its title, falling back to
    /// the body when the title names no version
    pub fn identify(&self, pr: &PullRequestRecord) -> VersionIdentifier {
        let id = self.codec.decode(&pr.title);
        if id.is_empty() {
            self.codec.decode(&pr.body)
        } else {
            id
        }
    }

    /// Split open PRs into those equivalent to `target` and those it
    /// supersedes
    pub async fn check(&self, target: &VersionIdentifier) -> Result<PrScan, HostingError> {
        let open = self.hosting.list_open_pull_requests().await?;

        let mut scan = PrScan::default();
        for pr in open.into_iter().filter(PullRequestRecord::is_open) {
            match self.codec.matches(target, &self.identify(&pr)) {
                IdentityMatch::Equivalent => scan.equivalent.push(pr),
                IdentityMatch::Overlapping => scan.superseded.push(pr),
                IdentityMatch::Disjoint => {}
            }
        }

        debug!(
            equivalent = scan.equivalent.len(),
            superseded = scan.superseded.len(),
            "scanned open PRs"
        );
        Ok(scan)
    }

    /// Close every candidate except `keep`, returning the closed numbers.
    ///
    /// Attempts every candidate even after a failure; the first failure is
    /// returned once all have been tried.
    pub async fn close_superseded(
        &self,
        candidates: &[PullRequestRecord],
        keep: Option<u64>,
    ) -> Result<Vec<u64>, HostingError> {
        let mut closed = Vec::new();
        let mut first_error = None;

        for pr in candidates.iter().filter(|pr| Some(pr.number) != keep) {
            if self.dry_run {
                info!(pr_number = pr.number, "would close superseded PR");
                closed.push(pr.number);
                continue;
            }
            match self.hosting.close_pull_request(pr.number).await {
                Ok(()) => {
                    info!(pr_number = pr.number, "closed superseded PR");
                    closed.push(pr.number);
                }
                Err(e) => {
                    warn!(pr_number = pr.number, error = %e, "failed to close superseded PR");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(closed),
        }
    }

    /// Merge each candidate whose checks pass
    pub async fn merge_if_passing(
        &self,
        candidates: &[PullRequestRecord],
    ) -> Result<MergeOutcome, HostingError> {
        let mut outcome = MergeOutcome::default();

        for pr in candidates {
            if pr.checks != CheckStatus::Passing {
                info!(pr_number = pr.number, checks = %pr.checks, "checks not green, not merging");
                outcome.waiting.push(pr.number);
                continue;
            }
            if self.dry_run {
                info!(pr_number = pr.number, "would merge PR");
                outcome.merged.push(pr.number);
                continue;
            }
            if self.hosting.merge_pull_request(pr.number).await? {
                info!(pr_number = pr.number, "merged PR");
                outcome.merged.push(pr.number);
            } else {
                warn!(pr_number = pr.number, "merge declined");
                outcome.waiting.push(pr.number);
            }
        }

        Ok(outcome)
    }
}
