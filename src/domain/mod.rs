//! Domain logic - pure release rules independent of git, host and changelog tooling

pub mod event;
pub mod extract;
pub mod intent;
pub mod pull_request;
pub mod version;

pub use event::{EventDescriptor, EventKind};
pub use extract::{extract_version, require_version};
pub use intent::{ReleaseIntent, ReleaseSource, SkipReason};
pub use pull_request::{PrState, PullRequest, ReleaseRequest};
pub use version::{resolve_version, Version};
