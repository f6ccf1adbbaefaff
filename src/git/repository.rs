use crate::error::{ReleasePrError, Result};
use crate::git::CommitInfo;
use git2::build::CheckoutBuilder;
use git2::{
    Commit, Cred, CredentialType, ErrorCode, FetchOptions, FetchPrune, IndexAddOption, PushOptions,
    RemoteCallbacks, Repository as Git2Repo, ResetType, Signature,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const BOT_NAME: &str = "github-actions[bot]";
const BOT_EMAIL: &str = "41898282+github-actions[bot]@users.noreply.github.com";

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Path of the `.git` directory
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(signature) => Ok(signature),
            Err(_) => Ok(Signature::now(BOT_NAME, BOT_EMAIL)?),
        }
    }

    fn find_commit(&self, rev: &str) -> Result<Commit<'_>> {
        Ok(self.repo.revparse_single(rev)?.peel_to_commit()?)
    }

    fn push(&self, remote_name: &str, refspec: &str) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|e| {
            ReleasePrError::external("git push", format!("Cannot find remote '{}': {}", remote_name, e))
        })?;

        let mut callbacks = remote_callbacks();
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "Push rejected for {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        debug!(remote = remote_name, refspec, "pushing");
        remote
            .push(&[refspec], Some(&mut push_options))
            .map_err(|e| {
                if e.class() == git2::ErrorClass::Net {
                    ReleasePrError::external("git push", format!("Network error for {}: {}", refspec, e))
                } else {
                    ReleasePrError::external("git push", format!("{}: {}", refspec, e))
                }
            })
    }
}

fn commit_to_info(commit: &Commit<'_>) -> CommitInfo {
    CommitInfo {
        hash: commit.id().to_string(),
        message: commit.message().unwrap_or("").to_string(),
        parents: commit.parent_ids().map(|id| id.to_string()).collect(),
    }
}

fn token_from_env() -> Option<String> {
    ["GITHUB_TOKEN", "GH_TOKEN"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|token| !token.is_empty())
}

/// Credentials for fetch and push: a host token over HTTPS, otherwise SSH
/// keys from ~/.ssh/ or the SSH agent, otherwise the default helper.
fn remote_callbacks() -> RemoteCallbacks<'static> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(token) = token_from_env() {
                return Cred::userpass_plaintext("x-access-token", &token);
            }
        }

        if allowed_types.contains(CredentialType::SSH_KEY) {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                let path = Path::new(&home).join(".ssh").join(key);
                if path.exists() {
                    if let Ok(cred) =
                        Cred::ssh_key(username_from_url.unwrap_or("git"), None, &path, None)
                    {
                        return Ok(cred);
                    }
                }
            }

            if let Ok(cred) = Cred::ssh_key_from_agent(username_from_url.unwrap_or("git")) {
                return Ok(cred);
            }
        }

        Cred::default()
    });
    callbacks
}

impl super::Repository for Git2Repository {
    fn workdir(&self) -> PathBuf {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.repo.path().to_path_buf())
    }

    fn fetch(&self, remote_name: &str) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|e| {
            ReleasePrError::external("git fetch", format!("Cannot find remote '{}': {}", remote_name, e))
        })?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks());
        fetch_options.prune(FetchPrune::On);

        let refspec_heads = format!("+refs/heads/*:refs/remotes/{}/*", remote_name);
        let refspecs = [refspec_heads.as_str(), "+refs/tags/*:refs/tags/*"];

        debug!(remote = remote_name, "fetching");
        remote
            .fetch(&refspecs, Some(&mut fetch_options), None)
            .map_err(|e| ReleasePrError::external("git fetch", format!("{}: {}", remote_name, e)))
    }

    fn remote_branch_tip(&self, remote: &str, branch: &str) -> Result<Option<CommitInfo>> {
        let reference_name = format!("refs/remotes/{}/{}", remote, branch);

        match self.repo.find_reference(&reference_name) {
            Ok(reference) => {
                let commit = reference.peel_to_commit()?;
                Ok(Some(commit_to_info(&commit)))
            }
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn commit_info(&self, rev: &str) -> Result<CommitInfo> {
        let commit = self.find_commit(rev)?;
        Ok(commit_to_info(&commit))
    }

    fn checkout_detached(&self, rev: &str) -> Result<()> {
        let commit = self.find_commit(rev)?;

        self.repo
            .checkout_tree(commit.as_object(), Some(&mut clean_checkout()))?;
        self.repo.set_head_detached(commit.id())?;

        debug!(commit = %commit.id(), "checked out detached HEAD");
        Ok(())
    }

    fn read_committed_file(&self, rev: &str, path: &Path) -> Result<Option<Vec<u8>>> {
        let commit = self.find_commit(rev)?;
        let tree = commit.tree()?;

        let entry = match tree.get_path(path) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let object = entry.to_object(&self.repo)?;
        let blob = object.peel_to_blob()?;
        Ok(Some(blob.content().to_vec()))
    }

    fn read_worktree_file(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(self.workdir().join(path)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn commit_all(&self, branch: &str, parent: &str, message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let parent_commit = self.find_commit(parent)?;
        let signature = self.signature()?;

        let oid = self.repo.commit(
            None,
            &signature,
            &signature,
            message,
            &tree,
            &[&parent_commit],
        )?;

        let reference_name = format!("refs/heads/{}", branch);
        self.repo
            .reference(&reference_name, oid, true, "release-pr: replace release commit")?;
        self.repo.set_head(&reference_name)?;

        debug!(branch, commit = %oid, "recorded release commit");
        Ok(oid.to_string())
    }

    fn force_push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.push(remote, &format!("+refs/heads/{0}:refs/heads/{0}", branch))
    }

    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.push(remote, &format!(":refs/heads/{}", branch))
    }

    fn reset_worktree(&self) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo
            .reset(head.as_object(), ResetType::Hard, Some(&mut clean_checkout()))?;
        Ok(())
    }

    fn create_annotated_tag(&self, name: &str, target: &str, message: &str) -> Result<()> {
        let target = self.find_commit(target)?;
        let signature = self.signature()?;

        self.repo
            .tag(name, target.as_object(), &signature, message, false)
            .map_err(|e| {
                if e.code() == ErrorCode::Exists {
                    ReleasePrError::version(format!("Tag '{}' already exists", name))
                } else {
                    e.into()
                }
            })?;

        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        self.push(remote, &format!("refs/tags/{0}:refs/tags/{0}", name))
    }
}

/// Forced checkout that also deletes untracked, non-ignored files
fn clean_checkout() -> CheckoutBuilder<'static> {
    let mut checkout = CheckoutBuilder::new();
    checkout.force().remove_untracked(true);
    checkout
}
