//! Test doubles for the engine's external seams
//!
//! These are test utilities - not every helper is used by every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use autobump::domain::{CheckStatus, NewPullRequest, PrState, PullRequestRecord};
use autobump::error::{GitError, HostingError, ProbeError};
use autobump::git::GitExecutor;
use autobump::hosting::{RemoteHosting, RepositoryRef};
use autobump::probe::ExistenceProber;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Commands that change the repository or publish anything
const MUTATING: &[&str] = &["add", "commit", "push"];

/// Git executor that records every call and answers from a canned table
#[derive(Default)]
pub struct FakeGit {
    calls: Mutex<Vec<String>>,
    responses: Mutex<HashMap<String, Vec<String>>>,
    failures: Mutex<HashMap<String, String>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command` (space-joined args) with `lines`
    pub fn respond(&self, command: &str, lines: &[&str]) {
        self.responses.lock().unwrap().insert(
            command.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        );
    }

    /// Make `command` fail with `stderr`
    pub fn fail(&self, command: &str, stderr: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(command.to_string(), stderr.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that create branches, stage, commit or push
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                let verb = c.split(' ').next().unwrap_or_default();
                MUTATING.contains(&verb) || c.starts_with("checkout -B bump/")
            })
            .collect()
    }
}

impl GitExecutor for FakeGit {
    fn run(&self, _dir: &Path, args: &[&str]) -> Result<Vec<String>, GitError> {
        let command = args.join(" ");
        self.calls.lock().unwrap().push(command.clone());
        if let Some(stderr) = self.failures.lock().unwrap().get(&command) {
            return Err(GitError::command_failed(command, stderr.clone()));
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&command)
            .cloned()
            .unwrap_or_default())
    }
}

/// Call record for `create_pull_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

/// In-memory hosting service
///
/// Features:
/// - Configurable open PRs
/// - Auto-incrementing PR numbers for created PRs
/// - Call tracking for verification
/// - Error injection for closes
pub struct MockHosting {
    repository: RepositoryRef,
    next_pr_number: AtomicU64,
    open: Mutex<Vec<PullRequestRecord>>,
    list_calls: AtomicU64,
    create_calls: Mutex<Vec<CreatePrCall>>,
    merge_calls: Mutex<Vec<u64>>,
    close_calls: Mutex<Vec<u64>>,
    error_on_close: Mutex<Option<u64>>,
}

impl MockHosting {
    pub fn new() -> Self {
        Self {
            repository: RepositoryRef::new("acme", "php"),
            next_pr_number: AtomicU64::new(100),
            open: Mutex::new(Vec::new()),
            list_calls: AtomicU64::new(0),
            create_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            close_calls: Mutex::new(Vec::new()),
            error_on_close: Mutex::new(None),
        }
    }

    /// Register an open PR
    pub fn with_open_pr(self, number: u64, title: &str, checks: CheckStatus) -> Self {
        self.open.lock().unwrap().push(open_pr(number, title, "", checks));
        self
    }

    /// Register an open PR whose identifier lives in the body
    pub fn with_open_pr_body(self, number: u64, title: &str, body: &str) -> Self {
        self.open
            .lock()
            .unwrap()
            .push(open_pr(number, title, body, CheckStatus::Passing));
        self
    }

    /// Make closing `number` fail
    pub fn fail_close(&self, number: u64) {
        *self.error_on_close.lock().unwrap() = Some(number);
    }

    /// Let closes succeed again
    pub fn allow_close(&self) {
        *self.error_on_close.lock().unwrap() = None;
    }

    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> Vec<CreatePrCall> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn merge_calls(&self) -> Vec<u64> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn close_calls(&self) -> Vec<u64> {
        self.close_calls.lock().unwrap().clone()
    }

    /// Whether anything other than listing happened
    pub fn was_mutated(&self) -> bool {
        !self.create_calls().is_empty()
            || !self.merge_calls().is_empty()
            || !self.close_calls().is_empty()
    }
}

fn open_pr(number: u64, title: &str, body: &str, checks: CheckStatus) -> PullRequestRecord {
    PullRequestRecord {
        number,
        branch: format!("bump/pr-{}", number),
        head_owner: "acme".to_string(),
        title: title.to_string(),
        body: body.to_string(),
        state: PrState::Open,
        checks,
        html_url: format!("https://github.com/acme/php/pull/{}", number),
    }
}

#[async_trait]
impl RemoteHosting for MockHosting {
    fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequestRecord>, HostingError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.open.lock().unwrap().clone())
    }

    async fn create_pull_request(
        &self,
        request: &NewPullRequest,
    ) -> Result<PullRequestRecord, HostingError> {
        self.create_calls.lock().unwrap().push(CreatePrCall {
            head: request.head.clone(),
            base: request.base.clone(),
            title: request.title.clone(),
            body: request.body.clone(),
        });
        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let (owner, branch) = request
            .head
            .split_once(':')
            .unwrap_or(("acme", request.head.as_str()));
        let record = PullRequestRecord {
            number,
            branch: branch.to_string(),
            head_owner: owner.to_string(),
            title: request.title.clone(),
            body: request.body.clone(),
            state: PrState::Open,
            checks: CheckStatus::Pending,
            html_url: format!("https://github.com/acme/php/pull/{}", number),
        };
        self.open.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn merge_pull_request(&self, number: u64) -> Result<bool, HostingError> {
        self.merge_calls.lock().unwrap().push(number);
        self.open.lock().unwrap().retain(|pr| pr.number != number);
        Ok(true)
    }

    async fn close_pull_request(&self, number: u64) -> Result<(), HostingError> {
        if *self.error_on_close.lock().unwrap() == Some(number) {
            return Err(HostingError::api(format!("cannot close #{}", number)));
        }
        self.close_calls.lock().unwrap().push(number);
        self.open.lock().unwrap().retain(|pr| pr.number != number);
        Ok(())
    }

    fn authenticated_url(&self, url: &str) -> String {
        url.to_string()
    }
}

/// Prober over a fixed set of published versions
pub struct StubProber {
    versions: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl StubProber {
    pub fn new(versions: &[&str]) -> Self {
        Self {
            versions: versions.iter().map(|v| v.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExistenceProber for StubProber {
    fn location(&self, version: &str) -> String {
        format!("https://downloads.example.org/php-{}.tar.gz", version)
    }

    async fn exists(&self, version: &str) -> Result<bool, ProbeError> {
        self.calls.lock().unwrap().push(version.to_string());
        Ok(self.versions.contains(version))
    }
}
