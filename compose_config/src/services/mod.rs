//! Lazy, memoised service construction from the composed service map.

mod catalog;
mod definition;

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use tracing::debug;

use crate::app::Application;
use crate::{ComposeError, ComposeResult, Mapping};

pub use catalog::{Service, ServiceInstance, TypeCatalog};
pub use definition::ServiceDefinition;

/// Resolves service identifiers to shared instances.
///
/// Each identifier is constructed at most once per resolver; later calls
/// return the same instance. The memo lock is released while a constructor
/// runs, so constructors may resolve other services through the
/// [`Application`] they receive.
pub struct ServiceResolver {
    definitions: Mapping,
    catalog: Arc<TypeCatalog>,
    instances: Mutex<HashMap<String, ServiceInstance>>,
    resolving: Mutex<Vec<(ThreadId, String)>>,
}

impl ServiceResolver {
    /// Create a resolver over the final service map.
    #[must_use]
    pub fn new(definitions: Mapping, catalog: Arc<TypeCatalog>) -> Self {
        Self {
            definitions,
            catalog,
            instances: Mutex::new(HashMap::new()),
            resolving: Mutex::new(Vec::new()),
        }
    }

    /// The service map this resolver was built from.
    #[must_use]
    pub const fn definitions(&self) -> &Mapping {
        &self.definitions
    }

    /// Returns `true` when `id` is defined.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Resolve `id`, constructing it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownServiceId`] for an undefined id,
    /// [`ComposeError::InvalidServiceDefinition`] for a malformed entry,
    /// [`ComposeError::UnknownServiceType`] when the type is not catalogued
    /// and [`ComposeError::CircularService`] when construction re-enters
    /// itself. Constructor failures are returned unchanged.
    pub fn resolve(&self, app: &Application, id: &str) -> ComposeResult<ServiceInstance> {
        if let Some(instance) = self.instances.lock().get(id) {
            return Ok(Arc::clone(instance));
        }
        let raw = self
            .definitions
            .get(id)
            .ok_or_else(|| Arc::new(ComposeError::UnknownServiceId { id: id.to_owned() }))?;
        let definition = ServiceDefinition::parse(id, raw)?;
        let constructor = self.catalog.constructor(id, definition.type_name())?;

        let _guard = ResolvingGuard::enter(&self.resolving, id)?;
        debug!(service = id, type_name = definition.type_name(), "constructing service");
        let instance = constructor(app, definition.options())?;

        let mut instances = self.instances.lock();
        Ok(Arc::clone(
            instances.entry(id.to_owned()).or_insert(instance),
        ))
    }

    /// Resolve `id` and downcast it to `T`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`ServiceResolver::resolve`], or
    /// [`ComposeError::ServiceTypeMismatch`] when the instance is not a `T`.
    pub fn resolve_as<T>(&self, app: &Application, id: &str) -> ComposeResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.resolve(app, id)?.downcast::<T>().map_err(|_| {
            Arc::new(ComposeError::ServiceTypeMismatch {
                id: id.to_owned(),
                expected: type_name::<T>(),
            })
        })
    }
}

impl fmt::Debug for ServiceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved = self.instances.lock().len();
        f.debug_struct("ServiceResolver")
            .field("definitions", &self.definitions)
            .field("catalog", &self.catalog)
            .field("resolved", &resolved)
            .finish_non_exhaustive()
    }
}

/// Marks `id` as under construction on the current thread until dropped.
struct ResolvingGuard<'a> {
    stack: &'a Mutex<Vec<(ThreadId, String)>>,
    thread: ThreadId,
}

impl<'a> ResolvingGuard<'a> {
    fn enter(stack: &'a Mutex<Vec<(ThreadId, String)>>, id: &str) -> ComposeResult<Self> {
        let thread = thread::current().id();
        let mut entries = stack.lock();
        let mut chain: Vec<&str> = entries
            .iter()
            .filter(|(owner, _)| *owner == thread)
            .map(|(_, pending)| pending.as_str())
            .collect();
        if chain.contains(&id) {
            chain.push(id);
            return Err(Arc::new(ComposeError::CircularService {
                chain: chain.join(" -> "),
            }));
        }
        entries.push((thread, id.to_owned()));
        Ok(Self { stack, thread })
    }
}

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        let mut entries = self.stack.lock();
        if let Some(pos) = entries.iter().rposition(|(owner, _)| *owner == self.thread) {
            entries.remove(pos);
        }
    }
}
