use crate::domain::{ReleaseRequest, Version};
use crate::engine::Settings;
use crate::error::Result;
use crate::git::Repository;
use crate::host::Host;
use tracing::{info, warn};

/// Tags the release commit and publishes the draft release
pub struct ReleaseFinalizer<'a, R, H> {
    repo: &'a R,
    host: &'a H,
    settings: &'a Settings,
}

impl<'a, R, H> ReleaseFinalizer<'a, R, H>
where
    R: Repository,
    H: Host,
{
    pub fn new(repo: &'a R, host: &'a H, settings: &'a Settings) -> Self {
        ReleaseFinalizer {
            repo,
            host,
            settings,
        }
    }

    /// Annotated tag `version` at `commit` carrying `body`, pushed, then a
    /// draft release with the same body.
    pub fn finalize(&self, version: &Version, commit: &str, body: &str) -> Result<ReleaseRequest> {
        let tag = version.to_string();

        self.repo.create_annotated_tag(&tag, commit, body)?;
        self.repo.push_tag(&self.settings.remote, &tag)?;
        info!(%tag, %commit, "pushed release tag");

        let request = ReleaseRequest::draft(version, body);
        self.host.create_release(&request)?;
        info!(%tag, prerelease = request.prerelease, "published draft release");

        if self.settings.delete_branch_after_release {
            self.delete_release_branch();
        }
        Ok(request)
    }

    /// The release is already out; failures here only warn.
    fn delete_release_branch(&self) {
        let remote = &self.settings.remote;
        let branch = &self.settings.pr_branch;

        match self.repo.remote_branch_tip(remote, branch) {
            Ok(Some(_)) => match self.repo.delete_remote_branch(remote, branch) {
                Ok(()) => info!(%branch, "deleted release branch"),
                Err(e) => warn!(%branch, error = %e, "could not delete release branch"),
            },
            Ok(None) => {}
            Err(e) => warn!(%branch, error = %e, "could not look up release branch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use crate::host::MockHost;

    #[test]
    fn test_finalize_tags_and_publishes_draft() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = MockRepository::new(dir.path());
        let commit = repo.push_remote_commit("main", "chore: release v2.0.0-rc.1", &[]);
        repo.push_remote_commit("release-pr", "chore: release v2.0.0-rc.1", &[]);
        let host = MockHost::new("main");
        let settings = Settings::new("main");

        let request = ReleaseFinalizer::new(&repo, &host, &settings)
            .finalize(&Version::parse("2.0.0-rc.1").unwrap(), &commit, "- feat: a\n")
            .unwrap();

        assert!(request.draft);
        assert!(request.prerelease);
        let tags = repo.tags();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "v2.0.0-rc.1");
        assert_eq!(tags[0].target, commit);
        assert_eq!(tags[0].message, "- feat: a\n");
        assert_eq!(repo.pushed_tags(), vec!["v2.0.0-rc.1".to_string()]);
        assert_eq!(host.releases(), vec![request]);
        assert!(repo.remote_branch_tip("origin", "release-pr").unwrap().is_none());
    }

    #[test]
    fn test_branch_kept_when_deletion_disabled() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = MockRepository::new(dir.path());
        let commit = repo.push_remote_commit("main", "chore: release v1.0.0", &[]);
        repo.push_remote_commit("release-pr", "chore: release v1.0.0", &[]);
        let host = MockHost::new("main");
        let mut settings = Settings::new("main");
        settings.delete_branch_after_release = false;

        ReleaseFinalizer::new(&repo, &host, &settings)
            .finalize(&Version::new(1, 0, 0), &commit, "notes")
            .unwrap();

        assert!(repo.remote_branch_tip("origin", "release-pr").unwrap().is_some());
    }
}
