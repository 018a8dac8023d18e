//! In-memory application sources.

use std::collections::HashMap;

use serde_json::Value;

use crate::{ArtifactKind, ComposeResult, Environment, Mapping, Mode};

use super::{AppSources, SourceDocument, parse_provider_list};

/// Application sources held in memory.
///
/// Useful for embedding composed defaults in a binary and for tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySources {
    providers: Option<Value>,
    base: HashMap<(ArtifactKind, Mode), Mapping>,
    overlays: HashMap<(ArtifactKind, Mode, Environment), Mapping>,
}

impl MemorySources {
    /// Create empty sources with no providers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// List providers by identifier, in precedence order.
    #[must_use]
    pub fn with_providers<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = ids.into_iter().map(|id| Value::String(id.into())).collect();
        self.providers = Some(Value::Array(list));
        self
    }

    /// Use a raw provider list value, validated when the pipeline reads it.
    #[must_use]
    pub fn with_provider_list(mut self, value: Value) -> Self {
        self.providers = Some(value);
        self
    }

    /// Set the base mapping for `kind` in `mode`.
    #[must_use]
    pub fn with_base(mut self, kind: ArtifactKind, mode: Mode, value: Mapping) -> Self {
        self.base.insert((kind, mode), value);
        self
    }

    /// Set the `environment` overlay for `kind` in `mode`.
    #[must_use]
    pub fn with_overlay(
        mut self,
        kind: ArtifactKind,
        mode: Mode,
        environment: Environment,
        value: Mapping,
    ) -> Self {
        self.overlays.insert((kind, mode, environment), value);
        self
    }
}

impl AppSources for MemorySources {
    fn provider_ids(&self) -> ComposeResult<Vec<String>> {
        self.providers
            .clone()
            .map_or_else(|| Ok(Vec::new()), |value| parse_provider_list(value, "provider list"))
    }

    fn base(&self, kind: ArtifactKind, mode: Mode) -> ComposeResult<Option<SourceDocument>> {
        Ok(self
            .base
            .get(&(kind, mode))
            .cloned()
            .map(SourceDocument::in_memory))
    }

    fn overlay(
        &self,
        kind: ArtifactKind,
        mode: Mode,
        environment: Environment,
    ) -> ComposeResult<Option<SourceDocument>> {
        Ok(self
            .overlays
            .get(&(kind, mode, environment))
            .cloned()
            .map(SourceDocument::in_memory))
    }
}
