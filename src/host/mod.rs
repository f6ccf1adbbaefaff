//! Source-control host abstraction (pull requests and releases)
//!
//! - [gh::GhCli]: GitHub through the `gh` command-line client
//! - [mock::MockHost]: In-memory host for tests

pub mod gh;
pub mod mock;

pub use gh::GhCli;
pub use mock::MockHost;

use crate::domain::{PullRequest, ReleaseRequest};
use crate::error::Result;

/// Host operations used by the release flows
pub trait Host {
    /// The open pull request from `head` into `base`, if any
    fn find_open_pr(&self, head: &str, base: &str) -> Result<Option<PullRequest>>;

    /// Look up a pull request by number, whatever its state
    fn get_pr(&self, number: u64) -> Result<PullRequest>;

    /// Open a pull request from `head` into `base`
    fn create_pr(&self, title: &str, body: &str, head: &str, base: &str) -> Result<PullRequest>;

    /// Edit the title and/or body of a pull request
    fn edit_pr(&self, number: u64, title: Option<&str>, body: Option<&str>) -> Result<()>;

    /// Publish a release for an already pushed tag
    fn create_release(&self, request: &ReleaseRequest) -> Result<()>;

    /// Name of the repository's default branch
    fn default_branch(&self) -> Result<String>;
}
