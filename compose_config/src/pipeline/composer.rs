//! Ordered layer stacks and the record of how they were folded.

use camino::Utf8PathBuf;
use tracing::debug;

use crate::merge::{merge_into, union_into};
use crate::{ArtifactKind, Mapping};

use super::{Layer, LayerOrigin};

/// How consecutive layers of an artifact combine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MergePolicy {
    /// Recursive last-wins merge.
    Deep,
    /// Recursive last-wins merge that skips empty layers entirely.
    DeepSkippingEmpty,
    /// Top-level map union, later entries replacing earlier ones.
    Union,
}

impl MergePolicy {
    /// Policy used for `kind`.
    ///
    /// Routes skip empty layers so that a layer defining no routes cannot
    /// wipe routes merged earlier; settings merge an empty layer as a no-op.
    #[must_use]
    pub const fn for_kind(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Settings => Self::Deep,
            ArtifactKind::Routes => Self::DeepSkippingEmpty,
            ArtifactKind::Services => Self::Union,
        }
    }
}

/// What happened to one layer during a fold.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LayerRecord {
    /// Where the layer came from.
    pub origin: LayerOrigin,
    /// File the layer was read from, if any.
    pub path: Option<Utf8PathBuf>,
    /// Number of top-level keys the layer carried.
    pub keys: usize,
    /// `false` when the layer was skipped.
    pub applied: bool,
}

/// A composed artifact together with its layer trace.
#[derive(Clone, Debug, PartialEq)]
pub struct Composition {
    kind: ArtifactKind,
    value: Mapping,
    records: Vec<LayerRecord>,
}

impl Composition {
    /// The artifact that was composed.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// The composed mapping.
    #[must_use]
    pub const fn value(&self) -> &Mapping {
        &self.value
    }

    /// Layers in application order, including skipped ones.
    #[must_use]
    pub fn records(&self) -> &[LayerRecord] {
        &self.records
    }

    /// Consume the composition, returning the mapping.
    #[must_use]
    pub fn into_value(self) -> Mapping {
        self.value
    }
}

/// Builder that accumulates [`Layer`]s for one artifact in precedence order.
#[derive(Debug)]
pub struct LayerStack {
    kind: ArtifactKind,
    layers: Vec<Layer>,
}

impl LayerStack {
    /// Create an empty stack for `kind`.
    #[must_use]
    pub const fn new(kind: ArtifactKind) -> Self {
        Self {
            kind,
            layers: Vec::new(),
        }
    }

    /// Push the next layer; later layers take precedence.
    ///
    /// Settings and routes layers have nested sequential mappings turned into
    /// lists; service maps are kept as given.
    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer.normalized_for(self.kind));
    }

    /// Layers pushed so far.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Fold every layer in order using the artifact's [`MergePolicy`].
    #[must_use]
    pub fn fold(self) -> Composition {
        let policy = MergePolicy::for_kind(self.kind);
        let mut value = Mapping::new();
        let mut records = Vec::with_capacity(self.layers.len());

        for layer in self.layers {
            let skip = policy == MergePolicy::DeepSkippingEmpty && layer.is_empty();
            records.push(LayerRecord {
                origin: layer.origin().clone(),
                path: layer.path().map(ToOwned::to_owned),
                keys: layer.value().len(),
                applied: !skip,
            });
            if skip {
                debug!(artifact = %self.kind, origin = %layer.origin(), "skipped empty layer");
                continue;
            }
            debug!(
                artifact = %self.kind,
                origin = %layer.origin(),
                keys = layer.value().len(),
                "applied layer"
            );
            match policy {
                MergePolicy::Deep | MergePolicy::DeepSkippingEmpty => {
                    merge_into(&mut value, layer.into_value());
                }
                MergePolicy::Union => union_into(&mut value, layer.into_value()),
            }
        }

        Composition {
            kind: self.kind,
            value,
            records,
        }
    }
}

impl IntoIterator for LayerStack {
    type Item = Layer;
    type IntoIter = std::vec::IntoIter<Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.into_iter()
    }
}
