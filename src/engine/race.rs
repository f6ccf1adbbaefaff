use crate::changelog::ChangelogGenerator;
use crate::domain::Version;
use crate::engine::Settings;
use crate::error::Result;
use crate::git::Repository;
use tracing::{debug, warn};

/// Verdict of the release-time changelog comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceCheck {
    Proceed,
    RaceDetected,
}

/// Cross-checks the merged changelog against the one the current history implies
pub struct RaceDetector<'a, R, C> {
    repo: &'a R,
    changelog: &'a C,
    settings: &'a Settings,
}

impl<'a, R, C> RaceDetector<'a, R, C>
where
    R: Repository,
    C: ChangelogGenerator,
{
    pub fn new(repo: &'a R, changelog: &'a C, settings: &'a Settings) -> Self {
        RaceDetector {
            repo,
            changelog,
            settings,
        }
    }

    /// Regenerate the changelog file for `version` in the work tree and
    /// compare it with the file committed at `release_commit`.
    ///
    /// The work tree must be checked out at `release_commit`. The
    /// regenerated file is left in place; callers reset afterwards.
    pub fn check(&self, version: &Version, release_commit: &str) -> Result<RaceCheck> {
        let path = &self.settings.changelog_path;
        self.changelog.write_file(version, path)?;

        let regenerated = self.repo.read_worktree_file(path)?;
        let committed = self.repo.read_committed_file(release_commit, path)?;

        let verdict = match (regenerated, committed) {
            (Some(regenerated), Some(committed))
                if same_content(&regenerated, &committed, self.settings.normalize_line_endings) =>
            {
                RaceCheck::Proceed
            }
            (_, None) => {
                warn!(path = %path.display(), "no committed changelog at the release commit");
                RaceCheck::RaceDetected
            }
            _ => RaceCheck::RaceDetected,
        };

        debug!(%version, commit = release_commit, ?verdict, "changelog comparison");
        Ok(verdict)
    }
}

fn same_content(regenerated: &[u8], committed: &[u8], normalize_line_endings: bool) -> bool {
    if normalize_line_endings {
        strip_carriage_returns(regenerated) == strip_carriage_returns(committed)
    } else {
        regenerated == committed
    }
}

/// `\r\n` becomes `\n`; lone `\r` are kept
fn strip_carriage_returns(content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    for (i, &byte) in content.iter().enumerate() {
        if byte == b'\r' && content.get(i + 1) == Some(&b'\n') {
            continue;
        }
        out.push(byte);
    }
    out
}
