//! Baseline and provider contracts consulted by the pipeline.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{ArtifactKind, ComposeError, ComposeResult, Mapping, Mode};

/// Fixed per-mode defaults supplied by the delivery layer.
///
/// The baseline is the first layer of every artifact and is never mutated.
pub trait Baseline: Send + Sync {
    /// Returns the baseline mapping for `kind` in `mode`.
    fn artifact(&self, kind: ArtifactKind, mode: Mode) -> Mapping;
}

/// An explicitly listed contributor of overlay settings, routes and
/// service entries.
///
/// Every accessor defaults to an empty mapping, so a provider implements
/// only the contributions it has.
///
/// # Examples
///
/// ```rust
/// use compose_config::{Mapping, Mode, Provider};
/// use serde_json::json;
///
/// struct MailProvider;
///
/// impl Provider for MailProvider {
///     fn service_map(&self, _mode: Mode) -> Mapping {
///         let mut map = Mapping::new();
///         map.insert("mailer".to_owned(), json!(["SmtpMailer", {"port": 25}]));
///         map
///     }
/// }
///
/// assert!(MailProvider.settings_overlay(Mode::Http).is_empty());
/// assert_eq!(MailProvider.service_map(Mode::Cli).len(), 1);
/// ```
pub trait Provider: Send + Sync {
    /// Settings overlay for `mode`.
    fn settings_overlay(&self, _mode: Mode) -> Mapping {
        Mapping::new()
    }

    /// Routes overlay for `mode`.
    fn routes_overlay(&self, _mode: Mode) -> Mapping {
        Mapping::new()
    }

    /// Service identifier map for `mode`.
    fn service_map(&self, _mode: Mode) -> Mapping {
        Mapping::new()
    }

    /// Dispatch to the accessor matching `kind`.
    fn contribution(&self, kind: ArtifactKind, mode: Mode) -> Mapping {
        match kind {
            ArtifactKind::Settings => self.settings_overlay(mode),
            ArtifactKind::Routes => self.routes_overlay(mode),
            ArtifactKind::Services => self.service_map(mode),
        }
    }
}

/// In-memory [`Baseline`] built from explicit mappings.
#[derive(Clone, Debug, Default)]
pub struct StaticBaseline {
    artifacts: HashMap<(ArtifactKind, Mode), Mapping>,
}

impl StaticBaseline {
    /// Create a baseline with no contributions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mapping for `kind` in `mode`.
    #[must_use]
    pub fn with(mut self, kind: ArtifactKind, mode: Mode, value: Mapping) -> Self {
        self.artifacts.insert((kind, mode), value);
        self
    }
}

impl Baseline for StaticBaseline {
    fn artifact(&self, kind: ArtifactKind, mode: Mode) -> Mapping {
        self.artifacts.get(&(kind, mode)).cloned().unwrap_or_default()
    }
}

/// Registry resolving provider identifiers to implementations.
///
/// Replaces runtime class discovery: a provider is only reachable when it is
/// registered here and named in the application's provider list.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under `id`, replacing any earlier registration.
    pub fn register(&mut self, id: impl Into<String>, provider: impl Provider + 'static) -> &mut Self {
        self.providers.insert(id.into(), Arc::new(provider));
        self
    }

    /// Builder form of [`ProviderRegistry::register`].
    #[must_use]
    pub fn with(mut self, id: impl Into<String>, provider: impl Provider + 'static) -> Self {
        self.register(id, provider);
        self
    }

    /// Look up the provider registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownProvider`] when `id` is not registered.
    pub fn get(&self, id: &str) -> ComposeResult<&dyn Provider> {
        self.providers
            .get(id)
            .map(|provider| &**provider)
            .ok_or_else(|| Arc::new(ComposeError::UnknownProvider { id: id.to_owned() }))
    }

    /// Returns `true` when `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns `true` when no provider is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("ProviderRegistry").field("ids", &ids).finish()
    }
}
