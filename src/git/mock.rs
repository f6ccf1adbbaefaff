use crate::error::{ReleasePrError, Result};
use crate::git::{CommitInfo, Repository};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

type Tree = BTreeMap<PathBuf, Vec<u8>>;

#[derive(Debug, Clone)]
struct MockCommit {
    info: CommitInfo,
    files: Tree,
}

/// An annotated tag recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTag {
    pub name: String,
    pub target: String,
    pub message: String,
}

#[derive(Debug, Default)]
struct State {
    commits: HashMap<String, MockCommit>,
    local_branches: HashMap<String, String>,
    remote_branches: HashMap<String, String>,
    head: Option<String>,
    tags: Vec<MockTag>,
    pushed_tags: Vec<String>,
    force_pushes: usize,
    fetches: usize,
    next_id: u64,
}

/// Mock repository for testing without libgit2
///
/// History lives in memory; the work tree is a real directory so external
/// steps (a changelog writer, a version command) can touch files in it.
/// A single remote is modelled regardless of the remote name passed in.
pub struct MockRepository {
    workdir: PathBuf,
    state: RefCell<State>,
}

impl MockRepository {
    /// Create an empty mock repository over `workdir`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        MockRepository {
            workdir: workdir.into(),
            state: RefCell::new(State::default()),
        }
    }

    /// Land a commit on the remote `branch`, on top of its current tip.
    ///
    /// `files` are written over the parent's files.
    pub fn push_remote_commit(&self, branch: &str, message: &str, files: &[(&str, &str)]) -> String {
        let mut state = self.state.borrow_mut();
        let parent = state.remote_branches.get(branch).cloned();
        let mut tree = parent
            .as_ref()
            .and_then(|p| state.commits.get(p))
            .map(|c| c.files.clone())
            .unwrap_or_default();
        for (path, content) in files {
            tree.insert(PathBuf::from(path), content.as_bytes().to_vec());
        }

        let hash = Self::record(&mut state, message, parent.into_iter().collect(), tree);
        state.remote_branches.insert(branch.to_string(), hash.clone());
        hash
    }

    /// Squash-merge the remote `from` branch into the remote `into` branch
    pub fn squash_merge(&self, from: &str, into: &str, message: &str) -> Result<String> {
        let mut state = self.state.borrow_mut();
        let source = Self::remote_commit(&state, from)?;
        let target = Self::remote_commit(&state, into)?;

        let files = Self::merged_tree(&target, &source);
        let hash = Self::record(&mut state, message, vec![target.info.hash], files);
        state.remote_branches.insert(into.to_string(), hash.clone());
        Ok(hash)
    }

    /// Merge the remote `from` branch into the remote `into` branch with a merge commit
    pub fn merge_commit(&self, from: &str, into: &str, message: &str) -> Result<String> {
        let mut state = self.state.borrow_mut();
        let source = Self::remote_commit(&state, from)?;
        let target = Self::remote_commit(&state, into)?;

        let files = Self::merged_tree(&target, &source);
        let hash = Self::record(
            &mut state,
            message,
            vec![target.info.hash, source.info.hash],
            files,
        );
        state.remote_branches.insert(into.to_string(), hash.clone());
        Ok(hash)
    }

    /// Number of commits between the remote `branch` tip and the remote `base`
    /// tip, following first parents. `None` if `base` is not an ancestor.
    pub fn commits_ahead(&self, branch: &str, base: &str) -> Option<usize> {
        let state = self.state.borrow();
        let base_tip = state.remote_branches.get(base)?;
        let mut current = state.remote_branches.get(branch)?.clone();
        let mut count = 0;

        while &current != base_tip {
            let commit = state.commits.get(&current)?;
            current = commit.info.parents.first()?.clone();
            count += 1;
        }
        Some(count)
    }

    /// Remote file content at the tip of `branch`
    pub fn remote_file(&self, branch: &str, path: &str) -> Option<String> {
        let state = self.state.borrow();
        let tip = state.remote_branches.get(branch)?;
        let content = state.commits.get(tip)?.files.get(Path::new(path))?;
        Some(String::from_utf8_lossy(content).into_owned())
    }

    /// Tags created locally
    pub fn tags(&self) -> Vec<MockTag> {
        self.state.borrow().tags.clone()
    }

    /// Tags pushed to the remote
    pub fn pushed_tags(&self) -> Vec<String> {
        self.state.borrow().pushed_tags.clone()
    }

    /// Number of branch force-pushes so far
    pub fn force_push_count(&self) -> usize {
        self.state.borrow().force_pushes
    }

    /// Number of fetches so far
    pub fn fetch_count(&self) -> usize {
        self.state.borrow().fetches
    }

    fn record(state: &mut State, message: &str, parents: Vec<String>, files: Tree) -> String {
        state.next_id += 1;
        let hash = format!("{:040x}", state.next_id);
        let info = CommitInfo {
            hash: hash.clone(),
            message: message.to_string(),
            parents,
        };
        state.commits.insert(hash.clone(), MockCommit { info, files });
        hash
    }

    /// Target files with the source files laid over them; conflicts go to the source
    fn merged_tree(target: &MockCommit, source: &MockCommit) -> Tree {
        let mut files = target.files.clone();
        files.extend(source.files.clone());
        files
    }

    fn remote_commit(state: &State, branch: &str) -> Result<MockCommit> {
        let hash = state.remote_branches.get(branch).ok_or_else(|| {
            ReleasePrError::config(format!("Branch not found: {}", branch))
        })?;
        Self::lookup(state, hash)
    }

    fn lookup(state: &State, rev: &str) -> Result<MockCommit> {
        let hash = state
            .local_branches
            .get(rev)
            .map(String::as_str)
            .unwrap_or(rev);
        state
            .commits
            .get(hash)
            .cloned()
            .ok_or_else(|| ReleasePrError::config(format!("Unknown revision: {}", rev)))
    }

    fn write_worktree(&self, files: &Tree) -> Result<()> {
        if self.workdir.exists() {
            for entry in fs::read_dir(&self.workdir)? {
                let path = entry?.path();
                if path.is_dir() {
                    fs::remove_dir_all(&path)?;
                } else {
                    fs::remove_file(&path)?;
                }
            }
        }
        fs::create_dir_all(&self.workdir)?;

        for (path, content) in files {
            let full = self.workdir.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full, content)?;
        }
        Ok(())
    }

    fn snapshot_worktree(&self) -> Result<Tree> {
        let mut tree = Tree::new();
        let mut pending = vec![self.workdir.clone()];

        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    let relative = path
                        .strip_prefix(&self.workdir)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|_| path.clone());
                    tree.insert(relative, fs::read(&path)?);
                }
            }
        }
        Ok(tree)
    }
}

impl Repository for MockRepository {
    fn workdir(&self) -> PathBuf {
        self.workdir.clone()
    }

    fn fetch(&self, _remote: &str) -> Result<()> {
        self.state.borrow_mut().fetches += 1;
        Ok(())
    }

    fn remote_branch_tip(&self, _remote: &str, branch: &str) -> Result<Option<CommitInfo>> {
        let state = self.state.borrow();
        Ok(state
            .remote_branches
            .get(branch)
            .and_then(|hash| state.commits.get(hash))
            .map(|commit| commit.info.clone()))
    }

    fn commit_info(&self, rev: &str) -> Result<CommitInfo> {
        Ok(Self::lookup(&self.state.borrow(), rev)?.info)
    }

    fn checkout_detached(&self, rev: &str) -> Result<()> {
        let commit = Self::lookup(&self.state.borrow(), rev)?;
        self.write_worktree(&commit.files)?;
        self.state.borrow_mut().head = Some(commit.info.hash);
        Ok(())
    }

    fn read_committed_file(&self, rev: &str, path: &Path) -> Result<Option<Vec<u8>>> {
        let commit = Self::lookup(&self.state.borrow(), rev)?;
        Ok(commit.files.get(path).cloned())
    }

    fn read_worktree_file(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(self.workdir.join(path)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn commit_all(&self, branch: &str, parent: &str, message: &str) -> Result<String> {
        let files = self.snapshot_worktree()?;
        let mut state = self.state.borrow_mut();
        let parent = Self::lookup(&state, parent)?.info.hash;

        let hash = Self::record(&mut state, message, vec![parent], files);
        state.local_branches.insert(branch.to_string(), hash.clone());
        state.head = Some(hash.clone());
        Ok(hash)
    }

    fn force_push_branch(&self, _remote: &str, branch: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let hash = state.local_branches.get(branch).cloned().ok_or_else(|| {
            ReleasePrError::config(format!("Local branch not found: {}", branch))
        })?;
        state.remote_branches.insert(branch.to_string(), hash);
        state.force_pushes += 1;
        Ok(())
    }

    fn delete_remote_branch(&self, _remote: &str, branch: &str) -> Result<()> {
        self.state.borrow_mut().remote_branches.remove(branch);
        Ok(())
    }

    fn reset_worktree(&self) -> Result<()> {
        let head = self
            .state
            .borrow()
            .head
            .clone()
            .ok_or_else(|| ReleasePrError::config("HEAD is not set"))?;
        self.checkout_detached(&head)
    }

    fn create_annotated_tag(&self, name: &str, target: &str, message: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.tags.iter().any(|tag| tag.name == name) {
            return Err(ReleasePrError::version(format!("Tag '{}' already exists", name)));
        }
        let target = Self::lookup(&state, target)?.info.hash;
        state.tags.push(MockTag {
            name: name.to_string(),
            target,
            message: message.to_string(),
        });
        Ok(())
    }

    fn push_tag(&self, _remote: &str, name: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.tags.iter().any(|tag| tag.name == name) {
            return Err(ReleasePrError::version(format!("Tag '{}' does not exist", name)));
        }
        state.pushed_tags.push(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_remote_commit_builds_history() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = MockRepository::new(dir.path());

        let first = repo.push_remote_commit("main", "feat: a", &[("a.txt", "a")]);
        let second = repo.push_remote_commit("main", "feat: b", &[("b.txt", "b")]);

        let tip = repo.remote_branch_tip("origin", "main").unwrap().unwrap();
        assert_eq!(tip.hash, second);
        assert_eq!(tip.parents, vec![first]);
        assert_eq!(repo.remote_file("main", "a.txt"), Some("a".to_string()));
        assert_eq!(repo.remote_file("main", "b.txt"), Some("b".to_string()));
    }

    #[test]
    fn test_checkout_and_commit_all_replace_branch() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = MockRepository::new(dir.path());
        let base = repo.push_remote_commit("main", "feat: a", &[("a.txt", "a")]);

        for round in 0..2 {
            repo.checkout_detached(&base).unwrap();
            fs::write(dir.path().join("CHANGELOG.md"), format!("round {}", round)).unwrap();
            repo.commit_all("release-pr", &base, "chore: release v0.1.0")
                .unwrap();
            repo.force_push_branch("origin", "release-pr").unwrap();
        }

        assert_eq!(repo.commits_ahead("release-pr", "main"), Some(1));
        assert_eq!(
            repo.remote_file("release-pr", "CHANGELOG.md"),
            Some("round 1".to_string())
        );
        assert_eq!(repo.force_push_count(), 2);
    }

    #[test]
    fn test_reset_worktree_discards_changes() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = MockRepository::new(dir.path());
        let base = repo.push_remote_commit("main", "init", &[("CHANGELOG.md", "old")]);

        repo.checkout_detached(&base).unwrap();
        fs::write(dir.path().join("CHANGELOG.md"), "new").unwrap();
        repo.reset_worktree().unwrap();

        let content = repo
            .read_worktree_file(Path::new("CHANGELOG.md"))
            .unwrap()
            .unwrap();
        assert_eq!(content, b"old");
    }

    #[test]
    fn test_tags_must_exist_before_push() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = MockRepository::new(dir.path());
        let base = repo.push_remote_commit("main", "init", &[]);

        assert!(repo.push_tag("origin", "v1.0.0").is_err());
        repo.create_annotated_tag("v1.0.0", &base, "notes").unwrap();
        assert!(repo.create_annotated_tag("v1.0.0", &base, "notes").is_err());
        repo.push_tag("origin", "v1.0.0").unwrap();
        assert_eq!(repo.pushed_tags(), vec!["v1.0.0".to_string()]);
    }
}
