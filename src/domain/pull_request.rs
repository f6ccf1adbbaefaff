use crate::domain::Version;

/// State of a pull request on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

/// Snapshot of a pull request as read from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub head_branch: String,
    pub base_branch: String,
    pub state: PrState,
}

/// Request to publish a release on the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    pub tag: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

impl ReleaseRequest {
    /// Draft release for `version`, flagged prerelease from the version itself
    pub fn draft(version: &Version, body: impl Into<String>) -> Self {
        ReleaseRequest {
            tag: version.to_string(),
            body: body.into(),
            draft: true,
            prerelease: version.is_prerelease(),
        }
    }
}
