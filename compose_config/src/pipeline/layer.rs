//! Layer metadata and transport values for composition.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use crate::merge::normalize_layer;
use crate::{ArtifactKind, Environment, Mapping};

/// Origin of a composition layer.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum LayerOrigin {
    /// The mode baseline supplied by the delivery layer.
    Baseline,
    /// A listed provider, identified by its registry id.
    Provider(String),
    /// The application's base source.
    AppBase,
    /// The application's overlay for the active environment.
    EnvironmentOverlay(Environment),
}

impl fmt::Display for LayerOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Baseline => f.write_str("baseline"),
            Self::Provider(id) => write!(f, "provider '{id}'"),
            Self::AppBase => f.write_str("application base"),
            Self::EnvironmentOverlay(env) => write!(f, "application {env} overlay"),
        }
    }
}

/// One ordered contribution to a composed artifact.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    origin: LayerOrigin,
    value: Mapping,
    path: Option<Utf8PathBuf>,
}

impl Layer {
    /// Construct a layer.
    ///
    /// The mapping is normalised when the layer is pushed onto a
    /// [`LayerStack`](super::LayerStack), since the rules depend on the
    /// artifact.
    #[must_use]
    pub const fn new(origin: LayerOrigin, value: Mapping, path: Option<Utf8PathBuf>) -> Self {
        Self {
            origin,
            value,
            path,
        }
    }

    /// Construct a baseline layer.
    #[must_use]
    pub const fn baseline(value: Mapping) -> Self {
        Self::new(LayerOrigin::Baseline, value, None)
    }

    /// Construct a provider layer.
    #[must_use]
    pub fn provider(id: impl Into<String>, value: Mapping) -> Self {
        Self::new(LayerOrigin::Provider(id.into()), value, None)
    }

    /// Returns the origin of the layer.
    #[must_use]
    pub const fn origin(&self) -> &LayerOrigin {
        &self.origin
    }

    /// Returns the file the layer was read from, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// Returns the layer's mapping.
    #[must_use]
    pub const fn value(&self) -> &Mapping {
        &self.value
    }

    /// Returns `true` when the layer contributes no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Normalise nested sequential mappings as appropriate for `kind`.
    pub(super) fn normalized_for(self, kind: ArtifactKind) -> Self {
        Self {
            value: normalize_layer(kind, self.value),
            ..self
        }
    }

    /// Consume the layer, returning its mapping.
    #[must_use]
    pub fn into_value(self) -> Mapping {
        self.value
    }
}
