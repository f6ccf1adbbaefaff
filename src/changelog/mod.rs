//! Changelog generation and next-version computation
//!
//! The release flows never parse commits themselves: the next version and
//! the changelog text both come from a [ChangelogGenerator].
//!
//! - [cliff::GitCliff]: the `git-cliff` command-line tool
//! - [mock::ScriptedChangelog]: scripted answers for tests

pub mod cliff;
pub mod mock;

pub use cliff::GitCliff;
pub use mock::ScriptedChangelog;

use crate::domain::Version;
use crate::error::Result;
use std::path::Path;

/// Source of the computed version and changelog for unreleased commits
pub trait ChangelogGenerator {
    /// Version the unreleased commits call for
    fn next_version(&self) -> Result<Version>;

    /// Changelog body for the unreleased commits, released as `version`
    fn render(&self, version: &Version) -> Result<String>;

    /// (Re)write the full changelog file at `path` (relative to the work
    /// tree) with the unreleased commits released as `version`
    fn write_file(&self, version: &Version, path: &Path) -> Result<()>;
}
