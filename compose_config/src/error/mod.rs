//! Error types produced while composing, caching and resolving artifacts.

mod constructors;
mod types;

pub use types::ComposeError;
