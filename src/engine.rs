//! Update engine coordinating one run for one project
//!
//! This module provides:
//! - Workflow coordination: sync -> discover -> reconcile -> patch -> publish
//! - Upstream discovery (probe) and commit porting as update sources
//! - Dry-run mode support
//!
//! Every run ends in exactly one `UpdateDecision`. Failures are returned as
//! errors and leave no pull request half-created: the PR is only opened
//! after the branch is pushed, and superseded PRs are only closed after the
//! new PR exists.

use crate::codec::IdentifierCodec;
use crate::config::ProjectSettings;
use crate::domain::version::{compare_versions, split_build};
use crate::domain::{ComponentUpdate, UpdateDecision, VersionUpdate};
use crate::error::{AppError, ConfigError};
use crate::git::{ForkRemote, GitExecutor, WorkingCopy, WorkingCopySettings};
use crate::hosting::RemoteHosting;
use crate::patcher::{current_versions, parse_commit_diff, FilePatcher};
use crate::probe::{ExistenceProber, VersionProbe};
use crate::progress::Progress;
use crate::reconcile::PrReconciler;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;
use tracing::{info, warn};

/// Per-run switches
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Merge equivalent PRs whose checks pass
    pub auto_merge: bool,
    /// Compute the decision without touching files, git or the hosting service
    pub dry_run: bool,
    /// Show a progress spinner
    pub show_progress: bool,
}

/// Outcome of one run, ready for formatting
#[derive(Debug, Clone)]
pub struct RunReport {
    pub project: String,
    pub updates: VersionUpdate,
    pub decision: UpdateDecision,
    pub dry_run: bool,
}

/// Latest published version of one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub component: String,
    /// Full version recorded in the tracked files
    pub current: String,
    /// Highest contiguous upstream version
    pub latest: String,
}

impl ProbeResult {
    /// Whether upstream is ahead of the recorded version
    pub fn is_outdated(&self) -> bool {
        let (current, _) = split_build(&self.current);
        compare_versions(&self.latest, current) == Ordering::Greater
    }
}

/// Build working-copy settings for a project, embedding credentials into the
/// clone and fork URLs
pub fn checkout_settings(
    settings: &ProjectSettings,
    hosting: &dyn RemoteHosting,
    web_host: &str,
) -> WorkingCopySettings {
    WorkingCopySettings {
        path: settings.path.clone(),
        origin_url: hosting.authenticated_url(&settings.clone_url(web_host)),
        base_branch: settings.base_branch.clone(),
        fork: settings.fork.as_ref().and_then(|owner| {
            settings.fork_url(web_host).map(|url| ForkRemote {
                owner: owner.clone(),
                url: hosting.authenticated_url(&url),
            })
        }),
    }
}

/// Engine for a single project
pub struct UpdateEngine<'a> {
    settings: &'a ProjectSettings,
    checkout: WorkingCopySettings,
    git: &'a dyn GitExecutor,
    hosting: &'a dyn RemoteHosting,
    prober: &'a dyn ExistenceProber,
    codec: IdentifierCodec,
    options: RunOptions,
    today: NaiveDate,
}

impl<'a> UpdateEngine<'a> {
    /// Create an engine. Fails when the identifier templates do not compile.
    pub fn new(
        settings: &'a ProjectSettings,
        checkout: WorkingCopySettings,
        git: &'a dyn GitExecutor,
        hosting: &'a dyn RemoteHosting,
        prober: &'a dyn ExistenceProber,
        options: RunOptions,
    ) -> Result<Self, ConfigError> {
        let codec = IdentifierCodec::new(&settings.identifier, &settings.version_value)?;
        Ok(Self {
            settings,
            checkout,
            git,
            hosting,
            prober,
            codec,
            options,
            today: Utc::now().date_naive(),
        })
    }

    /// Use a fixed run date for build codes
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Probe upstream for every tracked component and reconcile the result
    pub async fn run(&self) -> Result<RunReport, AppError> {
        let mut progress = Progress::new(self.options.show_progress);

        progress.spinner("Syncing working copy...");
        let mut wc = self.sync()?;
        progress.finish_and_clear();

        let results = self.probe_components(&wc, &mut progress).await?;
        let updates: VersionUpdate = results
            .iter()
            .filter(|r| r.is_outdated())
            .map(|r| self.component_update(r))
            .collect();

        self.reconcile(&mut wc, updates, &mut progress).await
    }

    /// Replay the version changes of `sha` from the checkout at `from`
    pub async fn port(&self, from: &Path, sha: &str) -> Result<RunReport, AppError> {
        let mut progress = Progress::new(self.options.show_progress);

        progress.spinner("Reading source commit...");
        let source = WorkingCopy::open(self.git, from)?;
        let lines = source.show_commit(sha)?;
        let updates = parse_commit_diff(&lines, &self.settings.components);
        progress.finish_and_clear();
        info!(sha, components = updates.len(), "parsed source commit");

        progress.spinner("Syncing working copy...");
        let mut wc = self.sync()?;
        progress.finish_and_clear();

        self.reconcile(&mut wc, updates, &mut progress).await
    }

    /// Report the latest available version per component without changing
    /// anything remote
    pub async fn probe(&self) -> Result<Vec<ProbeResult>, AppError> {
        let mut progress = Progress::new(self.options.show_progress);

        progress.spinner("Syncing working copy...");
        let wc = self.sync()?;
        progress.finish_and_clear();

        self.probe_components(&wc, &mut progress).await
    }

    fn sync(&self) -> Result<WorkingCopy<'a>, AppError> {
        WorkingCopy::ensure_cloned(self.git, self.checkout.clone())
    }

    async fn probe_components(
        &self,
        wc: &WorkingCopy<'_>,
        progress: &mut Progress,
    ) -> Result<Vec<ProbeResult>, AppError> {
        let components = self.settings.tracked_components()?;
        let recorded = current_versions(wc.path(), &self.settings.source_files, components)?;
        let probe = VersionProbe::new(self.prober);

        progress.start(recorded.len() as u64, "Probing upstream");
        let mut results = Vec::with_capacity(recorded.len());
        for (component, current) in recorded {
            progress.set_message(&format!("Probing {}", component));
            let (version, _) = split_build(&current);
            let latest = probe.find_latest_available(version).await?;
            info!(component = %component, current = %current, latest = %latest, "probed");
            results.push(ProbeResult {
                component,
                current,
                latest,
            });
            progress.inc();
        }
        progress.finish_and_clear();
        Ok(results)
    }

    fn component_update(&self, result: &ProbeResult) -> ComponentUpdate {
        let update = ComponentUpdate::new(&result.component, &result.latest)
            .with_from(&result.current);
        match self.settings.build_suffix.code(self.today) {
            Some(code) => update.with_build(code),
            None => update,
        }
    }

    async fn reconcile(
        &self,
        wc: &mut WorkingCopy<'_>,
        updates: VersionUpdate,
        progress: &mut Progress,
    ) -> Result<RunReport, AppError> {
        progress.spinner("Reconciling pull requests...");
        let decision = self.decide(wc, &updates).await;
        progress.finish_and_clear();

        let decision = decision?;
        if decision.needs_retry() {
            warn!(project = %self.settings.name, %decision, "update pending");
        } else {
            info!(project = %self.settings.name, %decision, "update decided");
        }

        Ok(RunReport {
            project: self.settings.name.clone(),
            updates,
            decision,
            dry_run: self.options.dry_run,
        })
    }

    async fn decide(
        &self,
        wc: &mut WorkingCopy<'_>,
        updates: &VersionUpdate,
    ) -> Result<UpdateDecision, AppError> {
        if updates.is_empty() {
            return Ok(UpdateDecision::NoChange);
        }

        let message = self.codec.encode(&self.settings.preamble, updates)?;
        let target = self.codec.decode(&message);
        let reconciler = PrReconciler::new(self.hosting, &self.codec, self.options.dry_run);
        let scan = reconciler.check(&target).await?;

        if scan.matched() {
            // Hosting-only cleanup; the checkout stays untouched
            let closed = reconciler.close_superseded(&scan.superseded, None).await?;
            if !self.options.auto_merge {
                return Ok(UpdateDecision::ExistingPrReused {
                    number: scan.equivalent[0].number,
                    closed,
                });
            }
            let outcome = reconciler.merge_if_passing(&scan.equivalent).await?;
            return Ok(if outcome.all_merged() {
                UpdateDecision::ExistingPrMerged {
                    numbers: outcome.merged,
                    closed,
                }
            } else {
                UpdateDecision::AwaitingChecks {
                    numbers: outcome.waiting,
                    closed,
                }
            });
        }

        let branch = updates.branch_name(&self.settings.branch_prefix);

        if self.options.dry_run {
            let changed = FilePatcher::new(true).apply_all(
                wc.path(),
                &self.settings.source_files,
                updates,
            )?;
            if changed.is_empty() {
                return Ok(UpdateDecision::NoChange);
            }
            let closed = reconciler.close_superseded(&scan.superseded, None).await?;
            return Ok(UpdateDecision::NewPrCreated {
                branch,
                number: None,
                closed,
            });
        }

        let checkout = wc.switch_or_create_branch(&branch)?;
        let changed = FilePatcher::new(false).apply_all(
            checkout.root(),
            &self.settings.source_files,
            updates,
        )?;
        if changed.is_empty() {
            info!(branch = %branch, "patch produced no diff");
            return Ok(UpdateDecision::NoChange);
        }

        let body = compose_body(&message, updates);
        let pushed = checkout.stage(&changed)?.commit(&message)?.push()?;
        let pr = pushed
            .open_pull_request(self.hosting, &message, &body)
            .await?;

        let closed = reconciler
            .close_superseded(&scan.superseded, Some(pr.number))
            .await?;

        Ok(UpdateDecision::NewPrCreated {
            branch,
            number: Some(pr.number),
            closed,
        })
    }
}

/// PR body: the message, then one `component: from -> to` line per bump
fn compose_body(message: &str, updates: &VersionUpdate) -> String {
    let mut body = String::from(message);
    body.push_str("\n\n");
    for update in updates.iter() {
        body.push_str(&format!("- {}\n", update));
    }
    body
}
