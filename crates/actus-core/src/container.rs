//! Dependency container.
//!
//! The [`Container`] trait is the only view of the container the rest of the
//! framework relies on: look an entry up by identifier and get back a
//! type-erased [`ServiceArc`]. [`get_as`] downcasts it to a concrete type.
//!
//! [`ServiceContainer`] is the bundled implementation. Entries come in three
//! flavours:
//!
//! - **instances**: a value registered up front and shared as-is;
//! - **singletons**: built by a factory on first lookup, then cached;
//! - **factories**: built by a factory on every lookup.
//!
//! ```rust,ignore
//! let mut container = ServiceContainer::new();
//! container
//!     .instance("db.url", String::from("postgres://localhost"))
//!     .singleton("db", |c| Ok(Database::connect(&get_as::<String>(c, "db.url")?)));
//!
//! let db = get_as::<Database>(&container, "db")?;
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::ContainerError;

/// A type-erased, shareable container entry.
pub type ServiceArc = Arc<dyn Any + Send + Sync>;

/// A shared container handle.
pub type BoxedContainer = Arc<dyn Container>;

/// Read-only access to registered entries.
pub trait Container: Send + Sync {
    /// Returns the entry registered under `id`.
    fn get(&self, id: &str) -> Result<ServiceArc, ContainerError>;

    /// Returns `true` if something is registered under `id`.
    fn has(&self, id: &str) -> bool;
}

/// Looks up `id` and downcasts the entry to `T`.
pub fn get_as<T>(container: &dyn Container, id: &str) -> Result<Arc<T>, ContainerError>
where
    T: Any + Send + Sync,
{
    container
        .get(id)?
        .downcast::<T>()
        .map_err(|_| ContainerError::TypeMismatch {
            id: id.to_string(),
            expected: type_name::<T>(),
        })
}

type EntryFactory = Arc<dyn Fn(&dyn Container) -> Result<ServiceArc, ContainerError> + Send + Sync>;

enum Entry {
    Instance(ServiceArc),
    Singleton {
        factory: EntryFactory,
        built: Mutex<Option<ServiceArc>>,
    },
    Factory(EntryFactory),
}

/// The default [`Container`] implementation.
#[derive(Default)]
pub struct ServiceContainer {
    entries: HashMap<String, Entry>,
}

impl ServiceContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ready-made value under `id`.
    pub fn instance<T>(&mut self, id: impl Into<String>, value: T) -> &mut Self
    where
        T: Any + Send + Sync,
    {
        self.entries
            .insert(id.into(), Entry::Instance(Arc::new(value)));
        self
    }

    /// Registers a value built on first lookup and shared afterwards.
    pub fn singleton<T, F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&dyn Container) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.entries.insert(
            id.into(),
            Entry::Singleton {
                factory: erase(factory),
                built: Mutex::new(None),
            },
        );
        self
    }

    /// Registers a value built anew on every lookup.
    pub fn factory<T, F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&dyn Container) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.entries
            .insert(id.into(), Entry::Factory(erase(factory)));
        self
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn erase<T, F>(factory: F) -> EntryFactory
where
    T: Any + Send + Sync,
    F: Fn(&dyn Container) -> Result<T, ContainerError> + Send + Sync + 'static,
{
    Arc::new(move |c: &dyn Container| {
        factory(c).map(|v| Arc::new(v) as ServiceArc)
    })
}

impl Container for ServiceContainer {
    fn get(&self, id: &str) -> Result<ServiceArc, ContainerError> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;

        match entry {
            Entry::Instance(value) => Ok(Arc::clone(value)),
            Entry::Factory(factory) => factory(self),
            Entry::Singleton { factory, built } => {
                if let Some(value) = built.lock().as_ref() {
                    return Ok(Arc::clone(value));
                }

                // Built outside the lock so the factory may look up other entries.
                let value = factory(self)?;
                trace!(id, "Built singleton entry");

                let mut slot = built.lock();
                Ok(Arc::clone(slot.get_or_insert(value)))
            }
        }
    }

    fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.entries.keys().collect();
        ids.sort();
        f.debug_struct("ServiceContainer")
            .field("entries", &ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_instance_lookup() {
        let mut container = ServiceContainer::new();
        container.instance("greeting", String::from("hello"));

        let value = get_as::<String>(&container, "greeting").unwrap();
        assert_eq!(value.as_str(), "hello");
        assert!(container.has("greeting"));
        assert!(!container.has("other"));
    }

    #[test]
    fn test_missing_entry() {
        let container = ServiceContainer::new();
        let err = container.get("nope").unwrap_err();
        assert!(matches!(err, ContainerError::NotFound(id) if id == "nope"));
    }

    #[test]
    fn test_type_mismatch() {
        let mut container = ServiceContainer::new();
        container.instance("number", 7_u32);

        let err = get_as::<String>(&container, "number").unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { .. }));
    }

    #[test]
    fn test_singleton_built_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut container = ServiceContainer::new();
        container.singleton("counter", move |_| {
            Ok(counter.fetch_add(1, Ordering::SeqCst))
        });

        let first = container.get("counter").unwrap();
        let second = container.get("counter").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_factory_built_every_time() {
        let mut container = ServiceContainer::new();
        container
            .instance("base", 10_u32)
            .factory("derived", |c| Ok(*get_as::<u32>(c, "base")? + 1));

        let first = container.get("derived").unwrap();
        let second = container.get("derived").unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*get_as::<u32>(&container, "derived").unwrap(), 11);
    }

    #[test]
    fn test_factory_error_propagates() {
        let mut container = ServiceContainer::new();
        container.factory::<u32, _>("broken", |c| {
            get_as::<u32>(c, "absent").map(|v| *v)
        });

        let err = container.get("broken").unwrap_err();
        assert!(matches!(err, ContainerError::NotFound(id) if id == "absent"));
    }
}
