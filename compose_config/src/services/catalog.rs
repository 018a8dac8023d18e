//! Registry of service constructors keyed by type name.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::app::Application;
use crate::{ComposeError, ComposeResult, Mapping};

/// A constructed service, shared by every caller that resolves its id.
pub type ServiceInstance = Arc<dyn Any + Send + Sync>;

type Constructor =
    dyn Fn(&Application, Option<&Mapping>) -> ComposeResult<ServiceInstance> + Send + Sync;

/// A type that can be built from a service definition.
///
/// # Examples
///
/// ```rust
/// use compose_config::{Application, ComposeResult, Mapping, Service, TypeCatalog};
///
/// struct Clock;
///
/// impl Service for Clock {
///     const TYPE_NAME: &'static str = "Clock";
///
///     fn construct(_app: &Application, _options: Option<&Mapping>) -> ComposeResult<Self> {
///         Ok(Self)
///     }
/// }
///
/// let catalog = TypeCatalog::new().with_service::<Clock>();
/// assert!(catalog.contains("Clock"));
/// ```
pub trait Service: Any + Send + Sync + Sized {
    /// Type reference used in service maps.
    const TYPE_NAME: &'static str;

    /// Build the service for `app`, with options when the definition is a
    /// `[type, options]` pair.
    ///
    /// # Errors
    ///
    /// Implementations return any [`ComposeError`]; it reaches the caller of
    /// `resolve` unchanged.
    fn construct(app: &Application, options: Option<&Mapping>) -> ComposeResult<Self>;
}

/// Explicit mapping from type references to constructors.
#[derive(Clone, Default)]
pub struct TypeCatalog {
    constructors: HashMap<String, Arc<Constructor>>,
}

impl TypeCatalog {
    /// Create an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` under `type_name`, replacing any earlier entry.
    pub fn register<F>(&mut self, type_name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&Application, Option<&Mapping>) -> ComposeResult<ServiceInstance>
            + Send
            + Sync
            + 'static,
    {
        self.constructors
            .insert(type_name.into(), Arc::new(constructor));
        self
    }

    /// Builder form of [`TypeCatalog::register`].
    #[must_use]
    pub fn with<F>(mut self, type_name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&Application, Option<&Mapping>) -> ComposeResult<ServiceInstance>
            + Send
            + Sync
            + 'static,
    {
        self.register(type_name, constructor);
        self
    }

    /// Register `T` under [`Service::TYPE_NAME`].
    pub fn register_service<T: Service>(&mut self) -> &mut Self {
        self.register(T::TYPE_NAME, |app, options| {
            T::construct(app, options).map(|service| Arc::new(service) as ServiceInstance)
        })
    }

    /// Builder form of [`TypeCatalog::register_service`].
    #[must_use]
    pub fn with_service<T: Service>(mut self) -> Self {
        self.register_service::<T>();
        self
    }

    /// Returns `true` when `type_name` is registered.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    pub(super) fn constructor(&self, id: &str, type_name: &str) -> ComposeResult<Arc<Constructor>> {
        self.constructors.get(type_name).cloned().ok_or_else(|| {
            Arc::new(ComposeError::UnknownServiceType {
                id: id.to_owned(),
                type_name: type_name.to_owned(),
            })
        })
    }
}

impl fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TypeCatalog").field("types", &names).finish()
    }
}
