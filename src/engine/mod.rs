//! The release state machine
//!
//! [ReleaseEngine] classifies an event and drives one of three flows:
//!
//! - prepare-pr: compute version and changelog, reconcile the release branch and PR
//! - set-version: the same, with the version taken from an edited PR title
//! - release: verify the merged changelog, then tag and publish a draft release
//!
//! Every flow re-reads the remote branches and the open PR before writing.

pub mod classifier;
pub mod finalizer;
pub mod race;
pub mod reconciler;

pub use classifier::classify;
pub use finalizer::ReleaseFinalizer;
pub use race::{RaceCheck, RaceDetector};
pub use reconciler::{BranchReconciler, ReconcileOutcome};

use crate::changelog::ChangelogGenerator;
use crate::config::Config;
use crate::domain::{
    extract_version, require_version, resolve_version, EventDescriptor, PrState, PullRequest,
    ReleaseIntent, ReleaseRequest, ReleaseSource, SkipReason, Version,
};
use crate::error::{ReleasePrError, Result};
use crate::git::{CommitInfo, Repository};
use crate::hooks::VersionCommand;
use crate::host::Host;
use std::path::PathBuf;
use tracing::{info, warn};

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub commit_prefix: String,
    pub pr_branch: String,
    pub target_branch: String,
    pub remote: String,
    pub changelog_path: PathBuf,
    pub version_cmd: Option<VersionCommand>,
    pub normalize_line_endings: bool,
    pub delete_branch_after_release: bool,
}

impl Settings {
    /// Default settings releasing from `target_branch`
    pub fn new(target_branch: impl Into<String>) -> Self {
        Self::from_config(&Config::default(), target_branch)
    }

    /// Settings from a loaded configuration. `target_branch` is passed
    /// separately because it may only be known from the event or the host.
    pub fn from_config(config: &Config, target_branch: impl Into<String>) -> Self {
        Settings {
            commit_prefix: config.commit_prefix.clone(),
            pr_branch: config.pr_branch.clone(),
            target_branch: target_branch.into(),
            remote: config.remote.clone(),
            changelog_path: config.changelog.path.clone(),
            version_cmd: VersionCommand::from_config(config.version_cmd.as_deref()),
            normalize_line_endings: config.changelog.normalize_line_endings,
            delete_branch_after_release: config.delete_branch_after_release,
        }
    }

    /// Canonical release commit message and PR title
    pub fn commit_message(&self, version: &Version) -> String {
        format!("{} {}", self.commit_prefix, version)
    }
}

/// Terminal outcome of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    PreparedPr,
    SetVersion,
    Released,
    Skipped,
}

impl RunResult {
    /// Value of the `result` step output
    pub fn as_output(&self) -> &'static str {
        match self {
            RunResult::PreparedPr => "prepared-pr",
            RunResult::SetVersion => "set-version",
            RunResult::Released => "released",
            RunResult::Skipped => "",
        }
    }
}

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub result: RunResult,
    pub version: Option<Version>,
    pub changelog: String,
    pub pull_request: Option<ReconcileOutcome>,
    pub release: Option<ReleaseRequest>,
    pub skip_reason: Option<SkipReason>,
}

impl RunReport {
    pub fn skipped(reason: SkipReason) -> Self {
        RunReport {
            result: RunResult::Skipped,
            version: None,
            changelog: String::new(),
            pull_request: None,
            release: None,
            skip_reason: Some(reason),
        }
    }

    fn reconciled(result: RunResult, reconciled: Reconciled) -> Self {
        RunReport {
            result,
            version: Some(reconciled.version),
            changelog: reconciled.body,
            pull_request: Some(reconciled.outcome),
            release: None,
            skip_reason: None,
        }
    }

    pub fn prerelease(&self) -> bool {
        self.version.as_ref().map_or(false, Version::is_prerelease)
    }
}

struct Reconciled {
    version: Version,
    body: String,
    outcome: ReconcileOutcome,
}

/// Drives the flows over a repository, a host and a changelog generator
pub struct ReleaseEngine<'a, R, H, C> {
    repo: &'a R,
    host: &'a H,
    changelog: &'a C,
    settings: Settings,
}

impl<'a, R, H, C> ReleaseEngine<'a, R, H, C>
where
    R: Repository,
    H: Host,
    C: ChangelogGenerator,
{
    pub fn new(repo: &'a R, host: &'a H, changelog: &'a C, settings: Settings) -> Self {
        ReleaseEngine {
            repo,
            host,
            changelog,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Classify `event` and run the matching flow
    pub fn run(&self, event: &EventDescriptor) -> Result<RunReport> {
        let intent = classify(event, &self.settings);
        info!(event = event.kind.name(), %intent, "classified event");
        self.execute(&intent, event)
    }

    /// Run the flow for an already classified `intent`.
    ///
    /// A detected race is returned as [ReleasePrError::RaceDetected] after
    /// the superseding release PR has been reconciled.
    pub fn execute(&self, intent: &ReleaseIntent, event: &EventDescriptor) -> Result<RunReport> {
        match intent {
            ReleaseIntent::Skip(reason) => {
                info!(%reason, "nothing to do");
                Ok(RunReport::skipped(reason.clone()))
            }
            ReleaseIntent::PreparePr => {
                let reconciled = self.prepare_pr()?;
                Ok(RunReport::reconciled(RunResult::PreparedPr, reconciled))
            }
            ReleaseIntent::SetVersion { pr_number } => self.set_version(*pr_number),
            ReleaseIntent::Release(source) => self.release(*source, event),
        }
    }

    fn prepare_pr(&self) -> Result<Reconciled> {
        self.repo.fetch(&self.settings.remote)?;
        let base = self.target_tip()?;
        self.repo.checkout_detached(&base.hash)?;

        let computed = self.changelog.next_version()?;
        let existing = self
            .host
            .find_open_pr(&self.settings.pr_branch, &self.settings.target_branch)?;

        let manual = existing.as_ref().and_then(|pr| self.title_version(pr));
        let version = resolve_version(manual.as_ref(), &computed);
        info!(%computed, %version, "resolved release version");

        self.reconcile(&base, version, existing.as_ref())
    }

    /// Version from an open PR's title; an unparsable title does not block preparation
    fn title_version(&self, pr: &PullRequest) -> Option<Version> {
        let version = extract_version(&pr.title, &self.settings.commit_prefix);
        if version.is_none() {
            warn!(pr = pr.number, title = %pr.title, "release PR title carries no version, ignoring it");
        }
        version
    }

    fn set_version(&self, pr_number: u64) -> Result<RunReport> {
        let pr = self.host.get_pr(pr_number)?;
        if pr.state != PrState::Open {
            let reason = SkipReason::PullRequestNotOpen { number: pr_number };
            info!(%reason, "nothing to do");
            return Ok(RunReport::skipped(reason));
        }
        let manual = require_version(&pr.title, &self.settings.commit_prefix)?;

        self.repo.fetch(&self.settings.remote)?;
        let base = self.target_tip()?;
        self.repo.checkout_detached(&base.hash)?;

        let computed = self.changelog.next_version()?;
        let version = resolve_version(Some(&manual), &computed);
        if version != manual {
            info!(%manual, %computed, "requested version is below the computed one, keeping computed");
        }

        let reconciled = self.reconcile(&base, version, Some(&pr))?;
        Ok(RunReport::reconciled(RunResult::SetVersion, reconciled))
    }

    fn reconcile(
        &self,
        base: &CommitInfo,
        version: Version,
        existing: Option<&PullRequest>,
    ) -> Result<Reconciled> {
        let body = self.changelog.render(&version)?;
        let outcome = BranchReconciler::new(self.repo, self.host, self.changelog, &self.settings)
            .reconcile(base, &version, &body, existing)?;
        Ok(Reconciled {
            version,
            body,
            outcome,
        })
    }

    fn release(&self, source: ReleaseSource, event: &EventDescriptor) -> Result<RunReport> {
        self.repo.fetch(&self.settings.remote)?;
        let commit = match &event.head_sha {
            Some(sha) => self.repo.commit_info(sha)?,
            None => self.target_tip()?,
        };
        let version = self.released_version(source, &commit)?;
        info!(%version, commit = %commit.hash, "releasing");

        self.repo.checkout_detached(&commit.hash)?;
        let verdict =
            RaceDetector::new(self.repo, self.changelog, &self.settings).check(&version, &commit.hash)?;

        if verdict == RaceCheck::RaceDetected {
            warn!(%version, "changelog changed since the release PR was prepared, not releasing");
            self.repo.reset_worktree()?;
            let superseding = self.prepare_pr()?;
            return Err(ReleasePrError::RaceDetected {
                version: version.to_string(),
                pr_number: superseding.outcome.pr_number(),
            });
        }

        let body = self.changelog.render(&version)?;
        self.repo.reset_worktree()?;
        let request =
            ReleaseFinalizer::new(self.repo, self.host, &self.settings).finalize(&version, &commit.hash, &body)?;

        Ok(RunReport {
            result: RunResult::Released,
            version: Some(version),
            changelog: body,
            pull_request: None,
            release: Some(request),
            skip_reason: None,
        })
    }

    /// Version a just-merged release PR carried
    fn released_version(&self, source: ReleaseSource, commit: &CommitInfo) -> Result<Version> {
        let prefix = &self.settings.commit_prefix;
        match source {
            ReleaseSource::SquashOrRebase => require_version(commit.subject(), prefix),
            ReleaseSource::MergeCommit {
                pr_number: Some(number),
            } => {
                let pr = self.host.get_pr(number)?;
                require_version(&pr.title, prefix)
            }
            ReleaseSource::MergeCommit { pr_number: None } => {
                let merged = commit
                    .parents
                    .get(1)
                    .ok_or_else(|| ReleasePrError::extraction_failed(commit.subject(), prefix.as_str()))?;
                let merged = self.repo.commit_info(merged)?;
                require_version(merged.subject(), prefix)
            }
        }
    }

    fn target_tip(&self) -> Result<CommitInfo> {
        self.repo
            .remote_branch_tip(&self.settings.remote, &self.settings.target_branch)?
            .ok_or_else(|| {
                ReleasePrError::config(format!(
                    "Target branch '{}' not found on remote '{}'",
                    self.settings.target_branch, self.settings.remote
                ))
            })
    }
}
