#![forbid(unsafe_code)]
//! Parse and validate `klean.toml` and `klean.lock`.

pub mod lockfile;
pub mod manifest;

pub use lockfile::Lockfile;
pub use manifest::Manifest;
