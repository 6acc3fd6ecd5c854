//! Terminal outcome of one engine run

use serde::Serialize;
use std::fmt;

/// Exactly one decision is produced per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpdateDecision {
    /// No version change, or the patch produced no diff
    NoChange,
    /// An equivalent open PR already exists and auto-merge is off
    ExistingPrReused {
        /// Reused PR number
        number: u64,
        /// Superseded PRs that were closed
        closed: Vec<u64>,
    },
    /// Equivalent open PRs were merged
    ExistingPrMerged {
        /// Merged PR numbers
        numbers: Vec<u64>,
        /// Superseded PRs that were closed
        closed: Vec<u64>,
    },
    /// A new branch and PR were produced
    NewPrCreated {
        /// Branch pushed for the PR
        branch: String,
        /// PR number; `None` in dry-run mode
        number: Option<u64>,
        /// Superseded PRs that were closed
        closed: Vec<u64>,
    },
    /// Auto-merge requested but checks are not green yet
    AwaitingChecks {
        /// PRs still waiting
        numbers: Vec<u64>,
        /// Superseded PRs that were closed
        closed: Vec<u64>,
    },
}

impl UpdateDecision {
    /// Short machine-friendly label
    pub fn kind(&self) -> &'static str {
        match self {
            UpdateDecision::NoChange => "no_change",
            UpdateDecision::ExistingPrReused { .. } => "existing_pr_reused",
            UpdateDecision::ExistingPrMerged { .. } => "existing_pr_merged",
            UpdateDecision::NewPrCreated { .. } => "new_pr_created",
            UpdateDecision::AwaitingChecks { .. } => "awaiting_checks",
        }
    }

    /// Returns true if the run should be retried later
    pub fn needs_retry(&self) -> bool {
        matches!(self, UpdateDecision::AwaitingChecks { .. })
    }
}

fn join_numbers(numbers: &[u64]) -> String {
    numbers
        .iter()
        .map(|n| format!("#{}", n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_closed(f: &mut fmt::Formatter<'_>, verb: &str, closed: &[u64]) -> fmt::Result {
    if closed.is_empty() {
        Ok(())
    } else {
        write!(f, ", {} {}", verb, join_numbers(closed))
    }
}

impl fmt::Display for UpdateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateDecision::NoChange => write!(f, "no change"),
            UpdateDecision::ExistingPrReused { number, closed } => {
                write!(f, "existing PR #{} already covers this update", number)?;
                write_closed(f, "closed", closed)
            }
            UpdateDecision::ExistingPrMerged { numbers, closed } => {
                write!(f, "merged {}", join_numbers(numbers))?;
                write_closed(f, "closed", closed)
            }
            UpdateDecision::NewPrCreated {
                branch,
                number,
                closed,
            } => {
                match number {
                    Some(n) => write!(f, "opened PR #{} from {}", n, branch)?,
                    None => write!(f, "would open a PR from {}", branch)?,
                }
                let verb = if number.is_some() { "closed" } else { "would close" };
                write_closed(f, verb, closed)
            }
            UpdateDecision::AwaitingChecks { numbers, closed } => {
                write!(f, "waiting for checks on {}", join_numbers(numbers))?;
                write_closed(f, "closed", closed)
            }
        }
    }
}
