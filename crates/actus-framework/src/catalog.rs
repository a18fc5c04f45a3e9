//! Registry of known domains and responders.
//!
//! Action definitions name their domain and responder by identifier. The
//! [`ActionCatalog`] is what gives those identifiers meaning: an identifier is
//! a domain if and only if a [`Domain`] implementation was registered under it,
//! and likewise for responders. Because registration is typed, "is this a
//! domain?" is settled once, when the application wires itself up, rather
//! than on every request.
//!
//! Two identifiers are reserved:
//!
//! - [`DOMAIN_MARKER`] names the domain capability itself; it is never a
//!   domain, only concrete implementations are.
//! - [`DEFAULT_RESPONDER`] names the responder used when a definition does not
//!   pick one. It is pre-registered with a [`JsonResponder`] and can be
//!   replaced through [`ActionCatalog::set_default_responder`].
//!
//! ```rust,ignore
//! let mut catalog = ActionCatalog::new();
//! catalog
//!     .register_domain("blog.list_posts", |c| Ok(ListPosts::new(get_as(c, "db")?)))?
//!     .register_responder("blog.html", |_| Ok(HtmlResponder))?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use actus_core::{Container, ContainerError};

use crate::domain::{BoxedDomain, Domain};
use crate::error::{CatalogError, CatalogResult};
use crate::responder::{BoxedResponder, JsonResponder, Responder};

/// Identifier of the domain capability itself.
pub const DOMAIN_MARKER: &str = "actus::Domain";

/// Identifier of the default responder.
pub const DEFAULT_RESPONDER: &str = "actus::Responder";

type DomainFactory = Arc<dyn Fn(&dyn Container) -> Result<BoxedDomain, ContainerError> + Send + Sync>;

type ResponderFactory =
    Arc<dyn Fn(&dyn Container) -> Result<BoxedResponder, ContainerError> + Send + Sync>;

/// A registered domain: its identifier and how to build it.
#[derive(Clone)]
pub struct DomainRef {
    id: Arc<str>,
    factory: DomainFactory,
}

impl DomainRef {
    /// The identifier the domain was registered under.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Builds the domain with dependencies from `container`.
    pub fn build(&self, container: &dyn Container) -> Result<BoxedDomain, ContainerError> {
        (self.factory)(container)
    }
}

impl PartialEq for DomainRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DomainRef {}

impl fmt::Debug for DomainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DomainRef").field(&self.id).finish()
    }
}

/// A registered responder: its identifier and how to build it.
#[derive(Clone)]
pub struct ResponderRef {
    id: Arc<str>,
    factory: ResponderFactory,
}

impl ResponderRef {
    /// The identifier the responder was registered under.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `true` for the default responder.
    pub fn is_default(&self) -> bool {
        &*self.id == DEFAULT_RESPONDER
    }

    /// Builds the responder with dependencies from `container`.
    pub fn build(&self, container: &dyn Container) -> Result<BoxedResponder, ContainerError> {
        (self.factory)(container)
    }
}

impl PartialEq for ResponderRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResponderRef {}

impl fmt::Debug for ResponderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResponderRef").field(&self.id).finish()
    }
}

/// Registry mapping identifiers to domain and responder factories.
pub struct ActionCatalog {
    domains: HashMap<Arc<str>, DomainRef>,
    responders: HashMap<Arc<str>, ResponderRef>,
    default_responder: ResponderRef,
}

impl ActionCatalog {
    /// Creates a catalog holding only the default [`JsonResponder`].
    pub fn new() -> Self {
        Self {
            domains: HashMap::new(),
            responders: HashMap::new(),
            default_responder: responder_ref(DEFAULT_RESPONDER, |_| Ok(JsonResponder::default())),
        }
    }

    /// Registers a domain under `id`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is empty, reserved, or already names a domain.
    pub fn register_domain<D, F>(&mut self, id: &str, factory: F) -> CatalogResult<&mut Self>
    where
        D: Domain,
        F: Fn(&dyn Container) -> Result<D, ContainerError> + Send + Sync + 'static,
    {
        check_identifier(id)?;
        if self.domains.contains_key(id) {
            return Err(CatalogError::DuplicateDomain(id.to_string()));
        }

        let factory: DomainFactory =
            Arc::new(move |c: &dyn Container| factory(c).map(|d| Arc::new(d) as BoxedDomain));
        let id: Arc<str> = Arc::from(id);
        self.domains.insert(
            Arc::clone(&id),
            DomainRef {
                id: Arc::clone(&id),
                factory,
            },
        );

        debug!(domain = %id, "Registered domain");
        Ok(self)
    }

    /// Registers a responder under `id`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is empty, reserved, or already names a responder.
    pub fn register_responder<R, F>(&mut self, id: &str, factory: F) -> CatalogResult<&mut Self>
    where
        R: Responder,
        F: Fn(&dyn Container) -> Result<R, ContainerError> + Send + Sync + 'static,
    {
        check_identifier(id)?;
        if self.responders.contains_key(id) {
            return Err(CatalogError::DuplicateResponder(id.to_string()));
        }

        let responder = responder_ref(id, factory);
        self.responders
            .insert(Arc::clone(&responder.id), responder);

        debug!(responder = %id, "Registered responder");
        Ok(self)
    }

    /// Replaces the responder used when a definition names none.
    pub fn set_default_responder<R, F>(&mut self, factory: F) -> &mut Self
    where
        R: Responder,
        F: Fn(&dyn Container) -> Result<R, ContainerError> + Send + Sync + 'static,
    {
        self.default_responder = responder_ref(DEFAULT_RESPONDER, factory);
        self
    }

    /// Returns the domain registered under `id`.
    pub fn domain(&self, id: &str) -> Option<&DomainRef> {
        self.domains.get(id)
    }

    /// Returns the responder for `id`, the default one for [`DEFAULT_RESPONDER`].
    pub fn responder(&self, id: &str) -> Option<&ResponderRef> {
        if id == DEFAULT_RESPONDER {
            Some(&self.default_responder)
        } else {
            self.responders.get(id)
        }
    }

    /// Returns the default responder.
    pub fn default_responder(&self) -> &ResponderRef {
        &self.default_responder
    }

    /// Returns `true` if `id` names a concrete domain.
    pub fn is_domain(&self, id: &str) -> bool {
        self.domains.contains_key(id)
    }

    /// Returns `true` if `id` is the default responder or names a registered one.
    pub fn is_responder(&self, id: &str) -> bool {
        id == DEFAULT_RESPONDER || self.responders.contains_key(id)
    }

    /// Number of registered domains.
    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    /// Number of registered responders, not counting the default one.
    pub fn responder_count(&self) -> usize {
        self.responders.len()
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCatalog")
            .field("domains", &self.domains.len())
            .field("responders", &self.responders.len())
            .finish()
    }
}

fn check_identifier(id: &str) -> CatalogResult<()> {
    if id.is_empty() {
        return Err(CatalogError::EmptyIdentifier);
    }
    if id == DOMAIN_MARKER || id == DEFAULT_RESPONDER {
        return Err(CatalogError::Reserved(id.to_string()));
    }
    Ok(())
}

fn responder_ref<R, F>(id: &str, factory: F) -> ResponderRef
where
    R: Responder,
    F: Fn(&dyn Container) -> Result<R, ContainerError> + Send + Sync + 'static,
{
    ResponderRef {
        id: Arc::from(id),
        factory: Arc::new(move |c: &dyn Container| {
            factory(c).map(|r| Arc::new(r) as BoxedResponder)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Input, Payload};
    use actus_core::{HandlerError, ServiceContainer};
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl Domain for Echo {
        async fn call(&self, input: Input) -> Result<Payload, HandlerError> {
            Ok(Payload::success(input))
        }
    }

    #[test]
    fn test_register_and_lookup_domain() {
        let mut catalog = ActionCatalog::new();
        catalog.register_domain("echo", |_| Ok(Echo)).unwrap();

        assert!(catalog.is_domain("echo"));
        assert!(!catalog.is_domain("other"));
        assert_eq!(catalog.domain("echo").unwrap().id(), "echo");
        assert_eq!(catalog.domain_count(), 1);
    }

    #[test]
    fn test_marker_is_never_a_domain() {
        let mut catalog = ActionCatalog::new();
        let err = catalog
            .register_domain(DOMAIN_MARKER, |_| Ok(Echo))
            .unwrap_err();

        assert_eq!(err, CatalogError::Reserved(DOMAIN_MARKER.to_string()));
        assert!(!catalog.is_domain(DOMAIN_MARKER));
    }

    #[test]
    fn test_duplicate_domain_rejected() {
        let mut catalog = ActionCatalog::new();
        catalog.register_domain("echo", |_| Ok(Echo)).unwrap();

        let err = catalog.register_domain("echo", |_| Ok(Echo)).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateDomain("echo".to_string()));
    }

    #[test]
    fn test_empty_identifier_rejected() {
        let mut catalog = ActionCatalog::new();
        assert_eq!(
            catalog.register_responder("", |_| Ok(JsonResponder::new())).unwrap_err(),
            CatalogError::EmptyIdentifier
        );
    }

    #[test]
    fn test_default_responder_always_present() {
        let catalog = ActionCatalog::new();

        assert!(catalog.is_responder(DEFAULT_RESPONDER));
        assert!(catalog.responder(DEFAULT_RESPONDER).unwrap().is_default());
        assert!(!catalog.is_responder("html"));
        assert_eq!(catalog.responder_count(), 0);
    }

    #[test]
    fn test_default_responder_cannot_be_registered() {
        let mut catalog = ActionCatalog::new();
        let err = catalog
            .register_responder(DEFAULT_RESPONDER, |_| Ok(JsonResponder::new()))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Reserved(_)));
    }

    #[test]
    fn test_domain_and_responder_namespaces_are_separate() {
        let mut catalog = ActionCatalog::new();
        catalog
            .register_domain("posts", |_| Ok(Echo))
            .unwrap()
            .register_responder("posts", |_| Ok(JsonResponder::new()))
            .unwrap();

        assert!(catalog.is_domain("posts"));
        assert!(catalog.is_responder("posts"));
    }

    #[test]
    fn test_factories_build_from_container() {
        let mut container = ServiceContainer::new();
        container.instance("pretty", true);

        let mut catalog = ActionCatalog::new();
        catalog.set_default_responder(|c| {
            let pretty = actus_core::get_as::<bool>(c, "pretty")?;
            Ok(JsonResponder { pretty: *pretty })
        });

        assert!(catalog.default_responder().build(&container).is_ok());
        assert!(
            catalog
                .default_responder()
                .build(&ServiceContainer::new())
                .is_err()
        );
    }
}
