use crate::domain::Version;
use crate::error::{ReleasePrError, Result};
use regex::Regex;

/// Extract the version that follows `prefix` at the start of `text`.
///
/// Only the first line of `text` is considered. The prefix must be followed
/// by whitespace, an optional `v`, and one whitespace-delimited token that is
/// a complete semantic version. Anything after that token is ignored, which
/// covers the ` (#12)` suffix hosts append to squash-merge subjects.
/// A token that is not valid semver yields `None`; there is no best guess.
pub fn extract_version(text: &str, prefix: &str) -> Option<Version> {
    let line = text.lines().next()?;
    let pattern = format!(r"^{}\s+[vV]?(\S+)", regex::escape(prefix));
    let re = Regex::new(&pattern).ok()?;
    let token = re.captures(line)?.get(1)?.as_str();

    semver::Version::parse(token).ok().map(Version::from)
}

/// Like [`extract_version`], but a missing version is an error.
pub fn require_version(text: &str, prefix: &str) -> Result<Version> {
    extract_version(text, prefix).ok_or_else(|| ReleasePrError::extraction_failed(text, prefix))
}
