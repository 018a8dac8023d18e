//! Ordered composition of settings, routes and service maps.
//!
//! Each artifact is folded from the same source order: mode baseline,
//! listed providers, application base, then the active environment overlay.

mod composer;
mod layer;
mod provider;

use tracing::debug;

use crate::sources::AppSources;
use crate::{ArtifactKind, ComposeResult, Environment, Mapping, Mode};

pub use composer::{Composition, LayerRecord, LayerStack, MergePolicy};
pub use layer::{Layer, LayerOrigin};
pub use provider::{Baseline, Provider, ProviderRegistry, StaticBaseline};

/// Composes artifacts from a baseline, registered providers and
/// application sources.
///
/// The pipeline borrows its inputs and holds no state between calls, so
/// composing the same artifact twice yields equal mappings.
///
/// # Examples
///
/// ```rust
/// use compose_config::{
///     ArtifactKind, CompositionPipeline, Environment, Mapping, MemorySources, Mode,
///     ProviderRegistry, StaticBaseline,
/// };
/// use serde_json::json;
///
/// let mut base = Mapping::new();
/// base.insert("debug".to_owned(), json!(false));
/// let baseline = StaticBaseline::new().with(ArtifactKind::Settings, Mode::Http, base);
/// let mut app = Mapping::new();
/// app.insert("debug".to_owned(), json!(true));
/// let sources = MemorySources::new().with_base(ArtifactKind::Settings, Mode::Http, app);
/// let registry = ProviderRegistry::new();
///
/// let pipeline =
///     CompositionPipeline::new(&baseline, &registry, &sources, Environment::Production);
/// let settings = pipeline.settings(Mode::Http)?;
/// assert_eq!(settings.get("debug"), Some(&json!(true)));
/// # Ok::<_, std::sync::Arc<compose_config::ComposeError>>(())
/// ```
#[derive(Clone, Copy)]
pub struct CompositionPipeline<'a> {
    baseline: &'a dyn Baseline,
    registry: &'a ProviderRegistry,
    sources: &'a dyn AppSources,
    environment: Environment,
}

impl<'a> CompositionPipeline<'a> {
    /// Create a pipeline over the given inputs.
    #[must_use]
    pub const fn new(
        baseline: &'a dyn Baseline,
        registry: &'a ProviderRegistry,
        sources: &'a dyn AppSources,
        environment: Environment,
    ) -> Self {
        Self {
            baseline,
            registry,
            sources,
            environment,
        }
    }

    /// Environment whose overlay is applied last.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Compose `kind` for `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider list is malformed, names an
    /// unregistered provider, or an application source is missing or
    /// malformed.
    pub fn compose(&self, kind: ArtifactKind, mode: Mode) -> ComposeResult<Mapping> {
        self.compose_traced(kind, mode).map(Composition::into_value)
    }

    /// Compose `kind` for `mode`, keeping a record of every layer.
    ///
    /// # Errors
    ///
    /// See [`CompositionPipeline::compose`].
    pub fn compose_traced(&self, kind: ArtifactKind, mode: Mode) -> ComposeResult<Composition> {
        let providers = self.resolve_providers()?;
        let mut stack = LayerStack::new(kind);
        stack.push(Layer::baseline(self.baseline.artifact(kind, mode)));
        for (id, provider) in providers {
            stack.push(Layer::provider(id, provider.contribution(kind, mode)));
        }
        if let Some(doc) = self.sources.base(kind, mode)? {
            stack.push(Layer::new(LayerOrigin::AppBase, doc.value, doc.path));
        }
        if let Some(doc) = self.sources.overlay(kind, mode, self.environment)? {
            stack.push(Layer::new(
                LayerOrigin::EnvironmentOverlay(self.environment),
                doc.value,
                doc.path,
            ));
        }
        debug!(artifact = %kind, mode = %mode, layers = stack.layers().len(), "composing artifact");
        Ok(stack.fold())
    }

    /// Compose the settings mapping for `mode`.
    ///
    /// # Errors
    ///
    /// See [`CompositionPipeline::compose`].
    pub fn settings(&self, mode: Mode) -> ComposeResult<Mapping> {
        self.compose(ArtifactKind::Settings, mode)
    }

    /// Compose the routes mapping for `mode`.
    ///
    /// # Errors
    ///
    /// See [`CompositionPipeline::compose`].
    pub fn routes(&self, mode: Mode) -> ComposeResult<Mapping> {
        self.compose(ArtifactKind::Routes, mode)
    }

    /// Compose the service identifier map for `mode`.
    ///
    /// # Errors
    ///
    /// See [`CompositionPipeline::compose`].
    pub fn services(&self, mode: Mode) -> ComposeResult<Mapping> {
        self.compose(ArtifactKind::Services, mode)
    }

    fn resolve_providers(&self) -> ComposeResult<Vec<(String, &'a dyn Provider)>> {
        let registry = self.registry;
        self.sources
            .provider_ids()?
            .into_iter()
            .map(|id| registry.get(&id).map(|provider| (id, provider)))
            .collect()
    }
}

impl std::fmt::Debug for CompositionPipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositionPipeline")
            .field("registry", self.registry)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}
