//! GitHub Actions integration: the triggering event and step outputs

pub mod outputs;
pub mod payload;

pub use outputs::{format_outputs, write_outputs};
pub use payload::{from_payload, load_from_env, load_with};
