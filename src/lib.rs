pub mod changelog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod git;
pub mod github;
pub mod hooks;
pub mod host;
pub mod lock;
pub mod logging;
pub mod notice;
pub mod process;
pub mod ui;

pub use error::{ReleasePrError, Result};
