//! Test helpers shared across crates in the compose-config workspace.
//!
//! - [`figment`]: a `figment::Jail` wrapper returning `anyhow` results;
//! - [`fixtures`]: temporary application roots with source files on disk.

pub mod figment;
pub mod fixtures;
