//! Application instances assembled from compiled or freshly composed
//! artifacts.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{ArtifactInvalidator, CacheCompiler, WarmOptions, WarmReport};
use crate::pipeline::{Baseline, CompositionPipeline, ProviderRegistry, StaticBaseline};
use crate::services::{ServiceInstance, ServiceResolver, TypeCatalog};
use crate::sources::{AppSources, FileSources};
use crate::{
    ArtifactKind, ComposeResult, ConfigTree, Environment, Mapping, Mode, StartupConfig,
};

/// One configured application: settings, routes and lazily built services.
///
/// Instances share nothing. Two applications built from the same inputs
/// hold equal configuration but resolve distinct service instances.
///
/// # Examples
///
/// ```rust
/// use compose_config::{
///     Application, ArtifactKind, Mapping, MemorySources, Mode, StartupConfig,
/// };
/// use serde_json::json;
///
/// let mut settings = Mapping::new();
/// settings.insert("name".to_owned(), json!("demo"));
/// let app = Application::builder(StartupConfig::new("/srv/demo", Mode::Cli))
///     .sources(MemorySources::new().with_base(ArtifactKind::Settings, Mode::Cli, settings))
///     .without_cache()
///     .build()?;
///
/// assert_eq!(app.settings().get("name")?.as_str(), Some("demo"));
/// assert!(app.routes().is_empty());
/// # Ok::<_, std::sync::Arc<compose_config::ComposeError>>(())
/// ```
pub struct Application {
    startup: StartupConfig,
    settings: ConfigTree,
    routes: Mapping,
    services: ServiceResolver,
}

impl Application {
    /// Start configuring an application for `startup`.
    #[must_use]
    pub fn builder(startup: StartupConfig) -> ApplicationBuilder {
        ApplicationBuilder::new(startup)
    }

    /// Startup parameters the application was built with.
    #[must_use]
    pub const fn startup(&self) -> &StartupConfig {
        &self.startup
    }

    /// Composed settings.
    #[must_use]
    pub const fn settings(&self) -> &ConfigTree {
        &self.settings
    }

    /// Composed routes.
    #[must_use]
    pub const fn routes(&self) -> &Mapping {
        &self.routes
    }

    /// Final service identifier map.
    #[must_use]
    pub const fn service_map(&self) -> &Mapping {
        self.services.definitions()
    }

    /// Execution mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.startup.mode()
    }

    /// Active environment.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.startup.environment()
    }

    /// Resolve the service registered under `id`.
    ///
    /// # Errors
    ///
    /// See [`ServiceResolver::resolve`].
    pub fn resolve(&self, id: &str) -> ComposeResult<ServiceInstance> {
        self.services.resolve(self, id)
    }

    /// Resolve `id` as a `T`.
    ///
    /// # Errors
    ///
    /// See [`ServiceResolver::resolve_as`].
    pub fn resolve_as<T>(&self, id: &str) -> ComposeResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.services.resolve_as(self, id)
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("startup", &self.startup)
            .field("settings", &self.settings)
            .field("routes", &self.routes)
            .field("services", &self.services)
            .finish()
    }
}

/// Collects the inputs of an [`Application`].
///
/// Defaults: an empty baseline, no providers, an empty type catalogue,
/// [`FileSources`] at the startup configuration directory and the compiled
/// cache enabled.
pub struct ApplicationBuilder {
    startup: StartupConfig,
    baseline: Box<dyn Baseline>,
    providers: ProviderRegistry,
    catalog: Arc<TypeCatalog>,
    sources: Option<Box<dyn AppSources>>,
    invalidator: Option<Arc<dyn ArtifactInvalidator>>,
    use_cache: bool,
}

impl ApplicationBuilder {
    fn new(startup: StartupConfig) -> Self {
        Self {
            startup,
            baseline: Box::new(StaticBaseline::new()),
            providers: ProviderRegistry::new(),
            catalog: Arc::new(TypeCatalog::new()),
            sources: None,
            invalidator: None,
            use_cache: true,
        }
    }

    /// Use `baseline` for the mode defaults.
    #[must_use]
    pub fn baseline(mut self, baseline: impl Baseline + 'static) -> Self {
        self.baseline = Box::new(baseline);
        self
    }

    /// Resolve listed provider ids against `providers`.
    #[must_use]
    pub fn providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    /// Construct services with `catalog`.
    #[must_use]
    pub fn catalog(mut self, catalog: TypeCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Read application sources from `sources` instead of the
    /// configuration directory.
    #[must_use]
    pub fn sources(mut self, sources: impl AppSources + 'static) -> Self {
        self.sources = Some(Box::new(sources));
        self
    }

    /// Notify `invalidator` when [`ApplicationBuilder::warm`] replaces
    /// artifacts.
    #[must_use]
    pub fn invalidator(mut self, invalidator: impl ArtifactInvalidator + 'static) -> Self {
        self.invalidator = Some(Arc::new(invalidator));
        self
    }

    /// Always compose through the pipeline, ignoring compiled artifacts.
    #[must_use]
    pub const fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    /// Compiler for the startup cache directory.
    #[must_use]
    pub fn cache(&self) -> CacheCompiler {
        let cache = CacheCompiler::new(self.startup.cache_dir());
        match &self.invalidator {
            Some(invalidator) => cache.with_invalidator(Arc::clone(invalidator)),
            None => cache,
        }
    }

    /// Compose and persist every artifact for the configured mode.
    ///
    /// # Errors
    ///
    /// See [`CacheCompiler::warm`].
    pub fn warm(&self, options: WarmOptions) -> ComposeResult<WarmReport> {
        let default_sources;
        let sources: &dyn AppSources = match &self.sources {
            Some(custom) => custom.as_ref(),
            None => {
                default_sources = FileSources::new(self.startup.config_dir());
                &default_sources
            }
        };
        let pipeline = CompositionPipeline::new(
            self.baseline.as_ref(),
            &self.providers,
            sources,
            self.startup.environment(),
        );
        self.cache().warm(&pipeline, self.startup.mode(), options)
    }

    /// Build the application.
    ///
    /// Each artifact is loaded from the compiled cache when a valid one
    /// exists and composed otherwise, so sources are only read for the
    /// artifacts that miss.
    ///
    /// # Errors
    ///
    /// Propagates composition errors for artifacts that miss the cache.
    pub fn build(self) -> ComposeResult<Application> {
        let cache = self.cache();
        let Self {
            startup,
            baseline,
            providers,
            catalog,
            sources: custom_sources,
            use_cache,
            ..
        } = self;
        let sources: Box<dyn AppSources> = match custom_sources {
            Some(custom) => custom,
            None => Box::new(FileSources::new(startup.config_dir())),
        };
        let pipeline = CompositionPipeline::new(
            baseline.as_ref(),
            &providers,
            sources.as_ref(),
            startup.environment(),
        );
        let mode = startup.mode();
        let load = |kind: ArtifactKind| -> ComposeResult<Mapping> {
            if let Some(value) = use_cache.then(|| cache.try_fast_path(kind, mode)).flatten() {
                debug!(artifact = %kind, mode = %mode, "loaded compiled artifact");
                return Ok(value);
            }
            pipeline.compose(kind, mode)
        };

        let settings = load(ArtifactKind::Settings)?;
        let routes = load(ArtifactKind::Routes)?;
        let services = load(ArtifactKind::Services)?;
        info!(
            mode = %mode,
            environment = %startup.environment(),
            services = services.len(),
            "application built"
        );
        Ok(Application {
            startup,
            settings: ConfigTree::new(settings),
            routes,
            services: ServiceResolver::new(services, catalog),
        })
    }
}

impl fmt::Debug for ApplicationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationBuilder")
            .field("startup", &self.startup)
            .field("providers", &self.providers)
            .field("catalog", &self.catalog)
            .field("use_cache", &self.use_cache)
            .finish_non_exhaustive()
    }
}
