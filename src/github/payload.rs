use crate::domain::{EventDescriptor, EventKind};
use crate::error::{ReleasePrError, Result};
use serde::Deserialize;
use std::fs;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    head_commit: Option<HeadCommit>,
    repository: Option<RepositoryPayload>,
    action: Option<String>,
    pull_request: Option<PullRequestPayload>,
    changes: Option<Changes>,
}

#[derive(Debug, Deserialize)]
struct HeadCommit {
    id: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    full_name: String,
    #[serde(default)]
    fork: bool,
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    #[serde(default)]
    title: String,
    base: PrRef,
    head: PrRef,
}

#[derive(Debug, Deserialize)]
struct PrRef {
    #[serde(rename = "ref")]
    git_ref: String,
    /// `null` when the head repository was deleted
    repo: Option<RepositoryPayload>,
}

#[derive(Debug, Deserialize)]
struct Changes {
    title: Option<serde_json::Value>,
}

/// Map a webhook payload to an [EventDescriptor].
///
/// `git_ref` and `repository` are the `GITHUB_REF` / `GITHUB_REPOSITORY`
/// values, used when the payload lacks them.
pub fn from_payload(
    event_name: &str,
    git_ref: Option<&str>,
    repository: Option<&str>,
    json: &str,
) -> Result<EventDescriptor> {
    let payload: Payload = if json.trim().is_empty() {
        Payload::default()
    } else {
        serde_json::from_str(json)
            .map_err(|e| ReleasePrError::event(format!("Malformed {} payload: {}", event_name, e)))?
    };

    let kind = EventKind::from_name(event_name);
    let repo = payload.repository.as_ref();

    let mut event = EventDescriptor {
        kind: kind.clone(),
        repo_full_name: repo
            .map(|r| r.full_name.clone())
            .or_else(|| repository.map(str::to_string)),
        is_fork: repo.map_or(false, |r| r.fork),
        default_branch: repo.and_then(|r| r.default_branch.clone()),
        ..Default::default()
    };

    match kind {
        EventKind::Push => {
            event.git_ref = payload.git_ref.or_else(|| git_ref.map(str::to_string));
            if let Some(head) = payload.head_commit {
                event.head_commit_subject = head.message.lines().next().map(str::to_string);
                event.head_sha = Some(head.id);
            }
        }
        EventKind::PullRequest => {
            let pr = payload.pull_request.ok_or_else(|| {
                ReleasePrError::event(format!("{} payload has no pull_request", event_name))
            })?;
            event.pr_action = payload.action;
            event.pr_title_changed = payload
                .changes
                .map_or(false, |changes| changes.title.is_some());
            event.pr_number = Some(pr.number);
            event.pr_title = Some(pr.title);
            event.base_ref = Some(pr.base.git_ref);
            event.head_ref = Some(pr.head.git_ref);
            event.pr_head_repo_full_name = pr.head.repo.map(|r| r.full_name);
            if let Some(base_repo) = pr.base.repo {
                event.repo_full_name = Some(base_repo.full_name);
            }
        }
        _ => {
            event.git_ref = payload.git_ref.or_else(|| git_ref.map(str::to_string));
        }
    }

    debug!(?event, "loaded event");
    Ok(event)
}

/// Load the triggering event from the Actions environment, reading
/// variables through `lookup`
pub fn load_with<F>(lookup: F) -> Result<EventDescriptor>
where
    F: Fn(&str) -> Option<String>,
{
    let name = lookup("GITHUB_EVENT_NAME")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ReleasePrError::event("GITHUB_EVENT_NAME is not set"))?;

    let json = match lookup("GITHUB_EVENT_PATH").filter(|path| !path.is_empty()) {
        Some(path) => fs::read_to_string(&path)
            .map_err(|e| ReleasePrError::event(format!("Cannot read event payload {}: {}", path, e)))?,
        None => String::new(),
    };

    from_payload(
        &name,
        lookup("GITHUB_REF").as_deref(),
        lookup("GITHUB_REPOSITORY").as_deref(),
        &json,
    )
}

/// Load the triggering event from the process environment
pub fn load_from_env() -> Result<EventDescriptor> {
    load_with(|name| std::env::var(name).ok())
}
