use crate::error::{ReleasePrError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Semantic version as carried in release commits, titles and tags.
///
/// Always rendered with a leading `v` (`v1.2.3`, `v2.0.0-rc.1+build.5`).
/// Equality is exact (build metadata included); ordering questions go
/// through [`Version::cmp_precedence`], which follows semver precedence
/// and ignores build metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(semver::Version);

impl Version {
    /// Create a release version without pre-release or build segments
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version(semver::Version::new(major, minor, patch))
    }

    /// Parse a version with an optional leading `v`/`V`.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let bare = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        semver::Version::parse(bare)
            .map(Version)
            .map_err(|e| ReleasePrError::version(format!("Invalid version '{}': {}", text, e)))
    }

    /// Whether the version carries a `-prerelease` segment
    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }

    /// Compare by semver precedence: core version, then pre-release
    /// (a pre-release sorts below the release of the same core version).
    pub fn cmp_precedence(&self, other: &Version) -> Ordering {
        (self.0.major, self.0.minor, self.0.patch)
            .cmp(&(other.0.major, other.0.minor, other.0.patch))
            .then_with(|| self.0.pre.cmp(&other.0.pre))
    }

    /// Whether a manually chosen version wins over the computed one.
    ///
    /// Pre-releases always win; otherwise the manual version must not be
    /// lower than the computed next version.
    pub fn overrides(&self, computed: &Version) -> bool {
        self.is_prerelease() || self.cmp_precedence(computed) != Ordering::Less
    }
}

/// Pick the version a release PR should carry.
///
/// `manual` is the version parsed from the PR title, if any.
pub fn resolve_version(manual: Option<&Version>, computed: &Version) -> Version {
    match manual {
        Some(manual) if manual.overrides(computed) => manual.clone(),
        _ => computed.clone(),
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<semver::Version> for Version {
    fn from(version: semver::Version) -> Self {
        Version(version)
    }
}

impl FromStr for Version {
    type Err = ReleasePrError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}
