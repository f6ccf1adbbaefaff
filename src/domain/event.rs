/// Kind of repository event that triggered a run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventKind {
    Push,
    PullRequest,
    #[default]
    Unknown,
    Other(String),
}

impl EventKind {
    /// Map a host event name (`GITHUB_EVENT_NAME`) to a kind
    pub fn from_name(name: &str) -> Self {
        match name {
            "push" => EventKind::Push,
            "pull_request" | "pull_request_target" => EventKind::PullRequest,
            "" => EventKind::Unknown,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EventKind::Push => "push",
            EventKind::PullRequest => "pull_request",
            EventKind::Unknown => "unknown",
            EventKind::Other(name) => name,
        }
    }
}

/// The slice of an incoming event that classification and the flows need.
///
/// Pull-request fields are `None` for pushes and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventDescriptor {
    pub kind: EventKind,
    /// Full ref of a push (`refs/heads/main`)
    pub git_ref: Option<String>,
    /// Base branch name of a pull request
    pub base_ref: Option<String>,
    /// Head branch name of a pull request
    pub head_ref: Option<String>,
    /// First line of the pushed head commit's message
    pub head_commit_subject: Option<String>,
    /// Hash of the pushed head commit
    pub head_sha: Option<String>,
    pub pr_action: Option<String>,
    pub pr_title_changed: bool,
    pub pr_title: Option<String>,
    pub pr_number: Option<u64>,
    pub pr_head_repo_full_name: Option<String>,
    pub repo_full_name: Option<String>,
    pub is_fork: bool,
    /// Default branch of the repository, when the payload carries it
    pub default_branch: Option<String>,
}

impl EventDescriptor {
    /// A push of `subject` to `git_ref` in a non-fork repository
    pub fn push(git_ref: impl Into<String>, subject: impl Into<String>) -> Self {
        EventDescriptor {
            kind: EventKind::Push,
            git_ref: Some(git_ref.into()),
            head_commit_subject: Some(subject.into()),
            ..Default::default()
        }
    }

    /// A pull request event on `head` -> `base` within `repo`
    pub fn pull_request(
        action: impl Into<String>,
        number: u64,
        base: impl Into<String>,
        head: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        let repo = repo.into();
        EventDescriptor {
            kind: EventKind::PullRequest,
            base_ref: Some(base.into()),
            head_ref: Some(head.into()),
            pr_action: Some(action.into()),
            pr_number: Some(number),
            pr_head_repo_full_name: Some(repo.clone()),
            repo_full_name: Some(repo),
            ..Default::default()
        }
    }

    /// Mark the event as having changed the pull request title
    pub fn with_title_change(mut self, title: impl Into<String>) -> Self {
        self.pr_title_changed = true;
        self.pr_title = Some(title.into());
        self
    }

    /// Branch name of a push ref, if it is a branch ref
    pub fn pushed_branch(&self) -> Option<&str> {
        self.git_ref.as_deref()?.strip_prefix("refs/heads/")
    }
}
