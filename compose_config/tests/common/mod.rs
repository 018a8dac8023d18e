//! Shared fixtures for integration tests.
//!
//! Provides a provider with fixed contributions and a helper for building
//! mappings from `json!` literals.

use compose_config::{Mapping, Mode, Provider};
use serde_json::Value;

/// Convert a JSON object literal into a [`Mapping`].
///
/// Non-object values produce an empty mapping.
pub fn mapping(value: Value) -> Mapping {
    match value {
        Value::Object(map) => map,
        _ => Mapping::new(),
    }
}

/// Provider returning the same contributions for every mode.
#[derive(Clone, Debug, Default)]
pub struct FixedProvider {
    pub settings: Mapping,
    pub routes: Mapping,
    pub services: Mapping,
}

impl FixedProvider {
    /// Provider contributing only service definitions.
    pub fn services(services: Value) -> Self {
        Self {
            services: mapping(services),
            ..Self::default()
        }
    }

    /// Provider contributing only settings.
    pub fn settings(settings: Value) -> Self {
        Self {
            settings: mapping(settings),
            ..Self::default()
        }
    }
}

impl Provider for FixedProvider {
    fn settings_overlay(&self, _mode: Mode) -> Mapping {
        self.settings.clone()
    }

    fn routes_overlay(&self, _mode: Mode) -> Mapping {
        self.routes.clone()
    }

    fn service_map(&self, _mode: Mode) -> Mapping {
        self.services.clone()
    }
}
