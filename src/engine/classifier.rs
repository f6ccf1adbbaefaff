//! Event classification
//!
//! Rules are applied in order and the first match wins:
//!
//! 1. push from a fork: skip
//! 2. push to anything but the target branch: skip
//! 3. push whose head subject is a release commit or a merge of the release
//!    branch: release, otherwise prepare-pr
//! 4. title edit of the release PR within the same repository: set-version,
//!    any failed check is a skip naming the check
//! 5. everything else: skip

use crate::domain::{EventDescriptor, EventKind, ReleaseIntent, ReleaseSource, SkipReason};
use crate::engine::Settings;

/// Decide what a single event asks for. Pure: no I/O.
pub fn classify(event: &EventDescriptor, settings: &Settings) -> ReleaseIntent {
    match event.kind {
        EventKind::Push => classify_push(event, settings),
        EventKind::PullRequest => classify_pull_request(event, settings),
        _ => ReleaseIntent::Skip(SkipReason::UnsupportedEvent {
            kind: event.kind.name().to_string(),
        }),
    }
}

fn classify_push(event: &EventDescriptor, settings: &Settings) -> ReleaseIntent {
    if event.is_fork {
        return ReleaseIntent::Skip(SkipReason::ForkRepository);
    }

    if event.pushed_branch() != Some(settings.target_branch.as_str()) {
        return ReleaseIntent::Skip(SkipReason::TargetBranchMismatch {
            expected: settings.target_branch.clone(),
            actual: event.git_ref.clone().unwrap_or_default(),
        });
    }

    let subject = event.head_commit_subject.as_deref().unwrap_or("");
    match release_source(subject, settings) {
        Some(source) => ReleaseIntent::Release(source),
        None => ReleaseIntent::PreparePr,
    }
}

/// Recognize a subject left on the target branch by merging the release PR
pub fn release_source(subject: &str, settings: &Settings) -> Option<ReleaseSource> {
    if is_release_commit(subject, &settings.commit_prefix) {
        return Some(ReleaseSource::SquashOrRebase);
    }
    merged_pr_number(subject, &settings.pr_branch)
        .map(|pr_number| ReleaseSource::MergeCommit { pr_number })
}

/// `<prefix>` followed by whitespace
fn is_release_commit(subject: &str, prefix: &str) -> bool {
    subject
        .strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .map_or(false, char::is_whitespace)
}

/// For `Merge pull request <reference> from [owner/]<branch>`, the PR number
/// if the reference holds a `#N`. The outer `None` means the subject is not a
/// merge of `branch` at all. A reference is required, so
/// `Merge pull request from <branch>` does not count.
fn merged_pr_number(subject: &str, branch: &str) -> Option<Option<u64>> {
    let rest = subject.strip_prefix("Merge pull request ")?;
    let (reference, source) = rest.trim_end().rsplit_once(" from ")?;

    let from_release_branch =
        source == branch || source.ends_with(&format!("/{}", branch));
    if !from_release_branch {
        return None;
    }

    let number = reference
        .split_whitespace()
        .find_map(|word| word.strip_prefix('#'))
        .and_then(|digits| digits.parse().ok());
    Some(number)
}

fn classify_pull_request(event: &EventDescriptor, settings: &Settings) -> ReleaseIntent {
    let base = event.base_ref.as_deref().unwrap_or("");
    if base != settings.target_branch {
        return ReleaseIntent::Skip(SkipReason::BaseBranchMismatch {
            expected: settings.target_branch.clone(),
            actual: base.to_string(),
        });
    }

    let head = event.head_ref.as_deref().unwrap_or("");
    if head != settings.pr_branch {
        return ReleaseIntent::Skip(SkipReason::HeadBranchMismatch {
            expected: settings.pr_branch.clone(),
            actual: head.to_string(),
        });
    }

    let head_repo = event.pr_head_repo_full_name.as_deref();
    if head_repo.is_none() || head_repo != event.repo_full_name.as_deref() {
        return ReleaseIntent::Skip(SkipReason::CrossRepositoryPullRequest {
            head_repo: head_repo.unwrap_or("<deleted>").to_string(),
        });
    }

    let action = event.pr_action.as_deref().unwrap_or("");
    if action != "edited" {
        return ReleaseIntent::Skip(SkipReason::ActionNotEdited {
            action: action.to_string(),
        });
    }

    if !event.pr_title_changed {
        return ReleaseIntent::Skip(SkipReason::TitleNotChanged);
    }

    match event.pr_number {
        Some(pr_number) => ReleaseIntent::SetVersion { pr_number },
        None => ReleaseIntent::Skip(SkipReason::MissingPullRequestNumber),
    }
}
