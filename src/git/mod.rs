//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations the
//! release flows need, allowing for a real libgit2-backed implementation and a
//! mock implementation for testing.
//!
//! # Overview
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory history over a real work tree directory
//!
//! Remote state is only ever read through remote-tracking refs refreshed by
//! [Repository::fetch]; nothing is cached between runs.
//!
//! ```rust
//! # use release_pr::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> release_pr::Result<()> {
//! repo.fetch("origin")?;
//! if let Some(tip) = repo.remote_branch_tip("origin", "main")? {
//!     println!("main is at {}: {}", tip.hash, tip.subject());
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Commit information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The full commit hash
    pub hash: String,
    /// The full commit message
    pub message: String,
    /// Parent commit hashes, first parent first
    pub parents: Vec<String>,
}

impl CommitInfo {
    /// First line of the commit message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim_end()
    }

    /// Whether this commit sits directly on top of `base`
    pub fn is_single_commit_on(&self, base: &str) -> bool {
        self.parents.len() == 1 && self.parents[0] == base
    }
}

/// Git operations used by the release flows
///
/// All paths are relative to the repository work tree root.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real Git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): Test implementation
pub trait Repository {
    /// Root of the work tree
    fn workdir(&self) -> PathBuf;

    /// Refresh all remote-tracking branches and tags from `remote`, pruning
    /// branches deleted on the remote
    fn fetch(&self, remote: &str) -> Result<()>;

    /// Tip of `branch` as last fetched from `remote`
    ///
    /// # Returns
    /// * `Ok(None)` - If the branch does not exist on the remote
    fn remote_branch_tip(&self, remote: &str, branch: &str) -> Result<Option<CommitInfo>>;

    /// Look up a commit by hash or revision
    fn commit_info(&self, rev: &str) -> Result<CommitInfo>;

    /// Force-check out `rev` with a detached HEAD, discarding work tree changes
    fn checkout_detached(&self, rev: &str) -> Result<()>;

    /// Content of `path` as committed in `rev`
    ///
    /// # Returns
    /// * `Ok(None)` - If the file does not exist in that commit
    fn read_committed_file(&self, rev: &str, path: &Path) -> Result<Option<Vec<u8>>>;

    /// Content of `path` in the work tree, `None` if absent
    fn read_worktree_file(&self, path: &Path) -> Result<Option<Vec<u8>>>;

    /// Stage every work tree change and record it as the only commit of
    /// `branch` on top of `parent`, replacing whatever the branch held.
    /// HEAD is moved to `branch`.
    ///
    /// # Returns
    /// * `Ok(String)` - Hash of the new commit
    fn commit_all(&self, branch: &str, parent: &str, message: &str) -> Result<String>;

    /// Force-push local `branch` to the same name on `remote`
    fn force_push_branch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Delete `branch` on `remote`
    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Discard every work tree change, including untracked files
    fn reset_worktree(&self) -> Result<()>;

    /// Create an annotated tag `name` on `target` with `message`
    fn create_annotated_tag(&self, name: &str, target: &str, message: &str) -> Result<()>;

    /// Push tag `name` to `remote`
    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;
}
