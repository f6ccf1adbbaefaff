use crate::changelog::ChangelogGenerator;
use crate::domain::{PullRequest, Version};
use crate::engine::Settings;
use crate::error::Result;
use crate::git::{CommitInfo, Repository};
use crate::host::Host;
use tracing::{debug, info};

/// What reconciliation did to the release PR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created(u64),
    Updated(u64),
    /// Branch and body already current; at most the title was normalized
    Unchanged(u64),
}

impl ReconcileOutcome {
    pub fn pr_number(&self) -> u64 {
        match self {
            ReconcileOutcome::Created(n)
            | ReconcileOutcome::Updated(n)
            | ReconcileOutcome::Unchanged(n) => *n,
        }
    }
}

/// Owner of the single-commit release branch and its pull request
pub struct BranchReconciler<'a, R, H, C> {
    repo: &'a R,
    host: &'a H,
    changelog: &'a C,
    settings: &'a Settings,
}

impl<'a, R, H, C> BranchReconciler<'a, R, H, C>
where
    R: Repository,
    H: Host,
    C: ChangelogGenerator,
{
    pub fn new(repo: &'a R, host: &'a H, changelog: &'a C, settings: &'a Settings) -> Self {
        BranchReconciler {
            repo,
            host,
            changelog,
            settings,
        }
    }

    /// Bring the release branch and PR in line with `version` and `body`.
    ///
    /// `base` is the current target-branch tip and `existing` the open
    /// release PR, both read fresh by the caller. The branch is rebuilt as
    /// one commit on `base` unless it already carries the canonical commit
    /// message on top of `base` and the PR body matches.
    pub fn reconcile(
        &self,
        base: &CommitInfo,
        version: &Version,
        body: &str,
        existing: Option<&PullRequest>,
    ) -> Result<ReconcileOutcome> {
        let message = self.settings.commit_message(version);
        let tip = self
            .repo
            .remote_branch_tip(&self.settings.remote, &self.settings.pr_branch)?;

        if let (Some(pr), Some(tip)) = (existing, tip.as_ref()) {
            if is_current(tip, base, &message, pr, body) {
                if pr.title != message {
                    info!(pr = pr.number, title = %message, "normalizing release PR title");
                    self.host.edit_pr(pr.number, Some(&message), None)?;
                }
                debug!(pr = pr.number, "release branch already current");
                return Ok(ReconcileOutcome::Unchanged(pr.number));
            }
        }

        self.rebuild_branch(base, version, &message)?;

        match existing {
            Some(pr) => {
                self.host.edit_pr(pr.number, Some(&message), Some(body))?;
                info!(pr = pr.number, %version, "updated release PR");
                Ok(ReconcileOutcome::Updated(pr.number))
            }
            None => {
                let pr = self.host.create_pr(
                    &message,
                    body,
                    &self.settings.pr_branch,
                    &self.settings.target_branch,
                )?;
                info!(pr = pr.number, %version, "opened release PR");
                Ok(ReconcileOutcome::Created(pr.number))
            }
        }
    }

    /// Replace the release branch with a single fresh commit on `base`
    fn rebuild_branch(&self, base: &CommitInfo, version: &Version, message: &str) -> Result<()> {
        self.repo.checkout_detached(&base.hash)?;

        if let Some(command) = &self.settings.version_cmd {
            command.execute(version, &self.repo.workdir())?;
        }
        self.changelog
            .write_file(version, &self.settings.changelog_path)?;

        let commit = self
            .repo
            .commit_all(&self.settings.pr_branch, &base.hash, message)?;
        self.repo
            .force_push_branch(&self.settings.remote, &self.settings.pr_branch)?;

        info!(branch = %self.settings.pr_branch, %commit, "force-pushed release commit");
        Ok(())
    }
}

fn is_current(tip: &CommitInfo, base: &CommitInfo, message: &str, pr: &PullRequest, body: &str) -> bool {
    tip.message.trim_end() == message
        && tip.is_single_commit_on(&base.hash)
        && pr.body.trim() == body.trim()
}
