use std::fmt;

/// How a just-merged release PR reached the target branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseSource {
    /// Squash or rebase merge: the head commit subject is the release commit message
    SquashOrRebase,
    /// True merge commit (`Merge pull request #N from ...`)
    MergeCommit { pr_number: Option<u64> },
}

/// Why an event was not acted upon
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ForkRepository,
    TargetBranchMismatch { expected: String, actual: String },
    BaseBranchMismatch { expected: String, actual: String },
    HeadBranchMismatch { expected: String, actual: String },
    CrossRepositoryPullRequest { head_repo: String },
    ActionNotEdited { action: String },
    TitleNotChanged,
    MissingPullRequestNumber,
    PullRequestNotOpen { number: u64 },
    UnsupportedEvent { kind: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ForkRepository => write!(f, "no releases in forks"),
            SkipReason::TargetBranchMismatch { expected, actual } => write!(
                f,
                "target branch mismatch: pushed to '{}', releases are cut from '{}'",
                actual, expected
            ),
            SkipReason::BaseBranchMismatch { expected, actual } => write!(
                f,
                "pull request targets '{}', not the release target '{}'",
                actual, expected
            ),
            SkipReason::HeadBranchMismatch { expected, actual } => write!(
                f,
                "pull request comes from '{}', not the release branch '{}'",
                actual, expected
            ),
            SkipReason::CrossRepositoryPullRequest { head_repo } => write!(
                f,
                "pull request head lives in another repository ({})",
                head_repo
            ),
            SkipReason::ActionNotEdited { action } => {
                write!(f, "pull request action is '{}', not 'edited'", action)
            }
            SkipReason::TitleNotChanged => write!(f, "pull request edit did not change the title"),
            SkipReason::MissingPullRequestNumber => {
                write!(f, "pull request event carries no number")
            }
            SkipReason::PullRequestNotOpen { number } => {
                write!(f, "pull request #{} is no longer open", number)
            }
            SkipReason::UnsupportedEvent { kind } => {
                write!(f, "event '{}' does not trigger releases", kind)
            }
        }
    }
}

/// Decided action for one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseIntent {
    Skip(SkipReason),
    PreparePr,
    SetVersion { pr_number: u64 },
    Release(ReleaseSource),
}

impl ReleaseIntent {
    pub fn name(&self) -> &'static str {
        match self {
            ReleaseIntent::Skip(_) => "skip",
            ReleaseIntent::PreparePr => "prepare-pr",
            ReleaseIntent::SetVersion { .. } => "set-version",
            ReleaseIntent::Release(_) => "release",
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            ReleaseIntent::Skip(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for ReleaseIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseIntent::Skip(reason) => write!(f, "skip ({})", reason),
            other => write!(f, "{}", other.name()),
        }
    }
}
