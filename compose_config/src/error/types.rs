//! Primary error enum for composition, caching and service resolution.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while composing artifacts or resolving services.
///
/// Every variant is fail-fast. The only failure the engine tolerates locally
/// is a missing or malformed cache artifact, which is reported as a miss
/// rather than an error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ComposeError {
    /// A required source location does not exist.
    #[error("required source not found: '{path}'")]
    SourceNotFound {
        /// Location that was expected to exist.
        path: Utf8PathBuf,
    },

    /// A source produced a value of the wrong shape.
    #[error("invalid source shape in {origin}: {message}")]
    InvalidSourceShape {
        /// Human-readable description of the offending source.
        origin: String,
        /// What was expected and what was found.
        message: String,
    },

    /// A source file exists but could not be read or parsed.
    #[error("failed to load source '{path}': {source}")]
    SourceParse {
        /// File that failed to load.
        path: Utf8PathBuf,
        /// Underlying read or parse failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A listed provider identifier is not registered.
    #[error("unknown provider '{id}'")]
    UnknownProvider {
        /// Identifier taken from the provider list.
        id: String,
    },

    /// Resolution was requested for an identifier absent from the service map.
    #[error("unknown service id '{id}'")]
    UnknownServiceId {
        /// Requested service identifier.
        id: String,
    },

    /// A service map entry is neither a type reference nor a `[type, options]` pair.
    #[error("invalid definition for service '{id}': {message}")]
    InvalidServiceDefinition {
        /// Service identifier whose definition is malformed.
        id: String,
        /// Description of the malformed shape.
        message: String,
    },

    /// A service definition names a type missing from the type catalogue.
    #[error("service '{id}' refers to unregistered type '{type_name}'")]
    UnknownServiceType {
        /// Service identifier being resolved.
        id: String,
        /// Type reference found in the definition.
        type_name: String,
    },

    /// A resolved service is not of the requested concrete type.
    #[error("service '{id}' is not a '{expected}'")]
    ServiceTypeMismatch {
        /// Service identifier being resolved.
        id: String,
        /// Name of the type the caller asked for.
        expected: &'static str,
    },

    /// A service constructor (transitively) resolved itself.
    #[error("circular service dependency: {chain}")]
    CircularService {
        /// Resolution chain, outermost first.
        chain: String,
    },

    /// A configuration tree lookup named an absent key.
    #[error("unknown configuration key '{key}'")]
    UnknownKey {
        /// Key (or dotted path) that was not found.
        key: String,
    },

    /// A mutation was attempted on an immutable configuration tree.
    #[error("configuration is immutable; cannot modify '{key}'")]
    ImmutableWrite {
        /// Key targeted by the rejected mutation.
        key: String,
    },

    /// Creating the cache directory, writing or renaming an artifact failed.
    #[error("failed to write cache artifact '{path}': {source}")]
    CacheWrite {
        /// Artifact or directory path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
