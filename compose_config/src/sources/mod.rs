//! Application-supplied sources: provider list, base and overlay mappings.

mod file;
mod memory;
mod parser;

use camino::Utf8PathBuf;
use serde_json::Value;

use crate::merge::kind_name;
use crate::{ArtifactKind, ComposeError, ComposeResult, Environment, Mapping, Mode};

pub use file::FileSources;
pub use memory::MemorySources;

/// A mapping read from an application source, with its file when known.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceDocument {
    /// The mapping the source produced.
    pub value: Mapping,
    /// File the mapping was read from, if it came from disk.
    pub path: Option<Utf8PathBuf>,
}

impl SourceDocument {
    /// Wrap an in-memory mapping.
    #[must_use]
    pub const fn in_memory(value: Mapping) -> Self {
        Self { value, path: None }
    }
}

/// Sources supplied by the application.
///
/// Implementations must be side-effect free: the pipeline may call each
/// method once per artifact.
pub trait AppSources: Send + Sync {
    /// Ordered provider identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidSourceShape`] when the list is not an
    /// array of identifiers.
    fn provider_ids(&self) -> ComposeResult<Vec<String>>;

    /// The application's base mapping for `kind` in `mode`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when a required source is missing or malformed.
    fn base(&self, kind: ArtifactKind, mode: Mode) -> ComposeResult<Option<SourceDocument>>;

    /// The application's `environment` overlay for `kind` in `mode`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the overlay exists but is malformed.
    fn overlay(
        &self,
        kind: ArtifactKind,
        mode: Mode,
        environment: Environment,
    ) -> ComposeResult<Option<SourceDocument>>;
}

/// Interpret `value` as an ordered list of provider identifiers.
///
/// Accepts either a bare array or a mapping whose only key is a
/// `providers` array.
pub(crate) fn parse_provider_list(value: Value, origin: &str) -> ComposeResult<Vec<String>> {
    let list = match value {
        Value::Object(mut map) => {
            let providers = map.remove("providers").ok_or_else(|| {
                ComposeError::invalid_shape(origin, "expected a `providers` key")
            })?;
            if let Some(extra) = map.keys().next() {
                return Err(ComposeError::invalid_shape(
                    origin,
                    format!("unexpected key '{extra}' beside `providers`"),
                ));
            }
            providers
        }
        other => other,
    };
    let items = match list {
        Value::Array(items) => items,
        other => {
            return Err(ComposeError::invalid_shape(
                origin,
                format!(
                    "expected a list of provider identifiers, found {}",
                    kind_name(&other)
                ),
            ));
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(id) if !id.is_empty() => Ok(id),
            other => Err(ComposeError::invalid_shape(
                origin,
                format!(
                    "provider entry {index} must be a non-empty string, found {}",
                    kind_name(&other)
                ),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests;
