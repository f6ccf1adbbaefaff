//! User hooks run during release preparation
//!
//! - `version_cmd`: patches version strings into project files before the
//!   changelog is regenerated; whatever it modifies lands in the release commit

pub mod executor;

pub use executor::VersionCommand;
