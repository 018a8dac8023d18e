//! Constructors for `ComposeError` values shared across modules.

use std::sync::Arc;

use camino::Utf8Path;

use super::ComposeError;

impl ComposeError {
    /// Construct an [`ComposeError::InvalidSourceShape`] wrapped in an [`Arc`].
    ///
    /// # Examples
    ///
    /// ```
    /// use compose_config::ComposeError;
    /// let err = ComposeError::invalid_shape("provider list", "expected an array");
    /// assert!(matches!(&*err, ComposeError::InvalidSourceShape { .. }));
    /// ```
    #[must_use]
    pub fn invalid_shape(origin: impl Into<String>, message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::InvalidSourceShape {
            origin: origin.into(),
            message: message.into(),
        })
    }

    /// Construct a [`ComposeError::SourceNotFound`] for `path`.
    #[must_use]
    pub fn source_not_found(path: &Utf8Path) -> Arc<Self> {
        Arc::new(Self::SourceNotFound {
            path: path.to_path_buf(),
        })
    }

    /// Construct a [`ComposeError::SourceParse`] for `path`.
    #[must_use]
    pub fn source_parse(
        path: &Utf8Path,
        err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Arc<Self> {
        Arc::new(Self::SourceParse {
            path: path.to_path_buf(),
            source: err.into(),
        })
    }

    /// Construct a [`ComposeError::CacheWrite`] for `path`.
    #[must_use]
    pub fn cache_write(path: &Utf8Path, source: std::io::Error) -> Arc<Self> {
        Arc::new(Self::CacheWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Construct a [`ComposeError::UnknownKey`].
    #[must_use]
    pub fn unknown_key(key: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::UnknownKey { key: key.into() })
    }

    /// Construct a [`ComposeError::ImmutableWrite`].
    #[must_use]
    pub fn immutable_write(key: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::ImmutableWrite { key: key.into() })
    }

    /// Construct a [`ComposeError::InvalidServiceDefinition`].
    #[must_use]
    pub fn invalid_definition(id: &str, message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::InvalidServiceDefinition {
            id: id.to_owned(),
            message: message.into(),
        })
    }
}
