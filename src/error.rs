use thiserror::Error;

/// Unified error type for release-pr operations
#[derive(Error, Debug)]
pub enum ReleasePrError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error(
        "No version found in '{text}': expected '{prefix} v<major>.<minor>.<patch>[-prerelease][+build]'"
    )]
    VersionExtractionFailed { text: String, prefix: String },

    #[error("Race detected: changelog for {version} changed since the release pull request was prepared, superseded by PR #{pr_number}")]
    RaceDetected { version: String, pr_number: u64 },

    #[error("{tool} failed: {message}")]
    External { tool: String, message: String },

    #[error("Event error: {0}")]
    Event(String),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in release-pr
pub type Result<T> = std::result::Result<T, ReleasePrError>;

impl ReleasePrError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleasePrError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleasePrError::Version(msg.into())
    }

    /// Create an event error with context
    pub fn event(msg: impl Into<String>) -> Self {
        ReleasePrError::Event(msg.into())
    }

    /// Create a lock error with context
    pub fn lock(msg: impl Into<String>) -> Self {
        ReleasePrError::Lock(msg.into())
    }

    /// Create an error for a failed external tool or host call
    pub fn external(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ReleasePrError::External {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create an extraction failure for `text` under `prefix`
    pub fn extraction_failed(text: impl Into<String>, prefix: impl Into<String>) -> Self {
        ReleasePrError::VersionExtractionFailed {
            text: text.into(),
            prefix: prefix.into(),
        }
    }
}
