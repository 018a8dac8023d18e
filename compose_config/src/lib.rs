//! Deterministic configuration and service composition.
//!
//! An application's settings, routes and service map are each composed from
//! an ordered list of layers: a per-mode baseline, the providers the
//! application lists, the application's own base sources and finally the
//! overlay for the active environment. Composed artifacts can be compiled to
//! an on-disk cache and loaded back without touching any source.
//!
//! ```rust
//! use compose_config::{
//!     Application, ArtifactKind, Mapping, MemorySources, Mode, Provider, ProviderRegistry,
//!     StartupConfig,
//! };
//! use serde_json::json;
//!
//! struct Mail;
//!
//! impl Provider for Mail {
//!     fn settings_overlay(&self, _mode: Mode) -> Mapping {
//!         let mut map = Mapping::new();
//!         map.insert("mail".to_owned(), json!({"host": "localhost", "port": 25}));
//!         map
//!     }
//! }
//!
//! let mut settings = Mapping::new();
//! settings.insert("mail".to_owned(), json!({"host": "smtp.example.com"}));
//! let sources = MemorySources::new()
//!     .with_providers(["mail"])
//!     .with_base(ArtifactKind::Settings, Mode::Http, settings);
//!
//! let app = Application::builder(StartupConfig::new("/srv/app", Mode::Http))
//!     .providers(ProviderRegistry::new().with("mail", Mail))
//!     .sources(sources)
//!     .without_cache()
//!     .build()?;
//!
//! assert_eq!(app.settings().lookup("mail.host")?.as_str(), Some("smtp.example.com"));
//! assert_eq!(app.settings().lookup("mail.port")?.as_i64(), Some(25));
//! # Ok::<_, std::sync::Arc<compose_config::ComposeError>>(())
//! ```

use std::sync::Arc;

mod app;
mod cache;
mod error;
mod kinds;
mod merge;
mod pipeline;
mod result_ext;
mod services;
mod sources;
mod startup;
mod tree;

pub use app::{Application, ApplicationBuilder};
pub use cache::{
    ArtifactInvalidator, CacheCompiler, FORMAT_VERSION, WarmOptions, WarmOutcome, WarmReport,
};
pub use error::ComposeError;
pub use kinds::{ArtifactKind, Environment, Mode};
pub use merge::{
    Mapping, is_integer_key, is_list, merge_into, merge_last_wins, normalize, normalize_value,
    union_into,
};
pub use pipeline::{
    Baseline, Composition, CompositionPipeline, Layer, LayerOrigin, LayerRecord, LayerStack,
    MergePolicy, Provider, ProviderRegistry, StaticBaseline,
};
pub use result_ext::ComposeResultExt;
pub use services::{Service, ServiceDefinition, ServiceInstance, ServiceResolver, TypeCatalog};
pub use sources::{AppSources, FileSources, MemorySources, SourceDocument};
pub use startup::{ENV_PREFIX, StartupConfig};
pub use tree::{ALWAYS_RAW_KEYS, ConfigTree, Node};

/// Result type used throughout the crate.
///
/// Errors are shared behind an [`Arc`] so they can be cloned cheaply when a
/// failure is reported to several callers.
pub type ComposeResult<T> = Result<T, Arc<ComposeError>>;
