//! The action resolver.
//!
//! [`ActionResolver`] decorates another [`DispatcherFactory`]. For every
//! handler value it is asked about it decides whether the value is a valid
//! action definition:
//!
//! - if it is, the value is replaced by an [`ActionRequestHandler`] built from
//!   the validated parts;
//! - otherwise the value is forwarded untouched, so the wrapped factory can
//!   resolve it some other way (or reject it).
//!
//! Either way exactly one call reaches the wrapped factory, with the middleware
//! queue as given, and its result is returned as is. The resolver never fails
//! on its own and keeps no state between calls.

use std::sync::Arc;

use tower_layer::Layer;

use actus_core::{
    BoxedContainer, Dispatcher, DispatcherFactory, FactoryError, HandlerValue, MiddlewareQueue,
};

use crate::action::{ActionRequestHandler, InputSources};
use crate::catalog::ActionCatalog;
use crate::definition::ActionDefinition;

/// Outcome of looking at a single handler value.
#[derive(Debug)]
pub enum Resolution {
    /// The value was a valid action definition.
    Resolved(ActionRequestHandler),
    /// The value was not a valid definition and is handed back unchanged.
    Unresolved(HandlerValue),
}

impl Resolution {
    /// Returns `true` if an action handler was built.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Returns the action handler, if one was built.
    pub fn as_action(&self) -> Option<&ActionRequestHandler> {
        match self {
            Self::Resolved(action) => Some(action),
            Self::Unresolved(_) => None,
        }
    }

    /// The handler value to pass on to the next factory.
    pub fn into_handler(self) -> HandlerValue {
        match self {
            Self::Resolved(action) => HandlerValue::instance(action),
            Self::Unresolved(handler) => handler,
        }
    }
}

/// Dispatcher factory decorator turning ADR action definitions into handlers.
pub struct ActionResolver<F> {
    container: BoxedContainer,
    catalog: Arc<ActionCatalog>,
    delegate: F,
    sources: InputSources,
}

impl<F> ActionResolver<F> {
    /// Creates a resolver in front of `delegate`.
    ///
    /// `container` is handed to every action handler the resolver builds;
    /// `catalog` decides which identifiers name domains and responders.
    pub fn new(container: BoxedContainer, catalog: Arc<ActionCatalog>, delegate: F) -> Self {
        Self {
            container,
            catalog,
            delegate,
            sources: InputSources::default(),
        }
    }

    /// Sets the input sources of the action handlers built from now on.
    pub fn with_input_sources(mut self, sources: InputSources) -> Self {
        self.sources = sources;
        self
    }

    /// Returns the wrapped factory.
    pub fn delegate(&self) -> &F {
        &self.delegate
    }

    /// Returns the catalog definitions are validated against.
    pub fn catalog(&self) -> &Arc<ActionCatalog> {
        &self.catalog
    }

    /// Decides what `handler` becomes, without touching the wrapped factory.
    pub fn resolve(&self, handler: HandlerValue) -> Resolution {
        let parts = ActionDefinition::from_handler(&handler)
            .and_then(|definition| definition.validate(&self.catalog));

        match parts {
            Some(parts) => Resolution::Resolved(
                ActionRequestHandler::new(
                    Arc::clone(&self.container),
                    parts.domain,
                    parts.responder,
                    parts.input,
                )
                .with_sources(self.sources),
            ),
            None => Resolution::Unresolved(handler),
        }
    }
}

impl<F: DispatcherFactory> DispatcherFactory for ActionResolver<F> {
    fn create(
        &self,
        handler: HandlerValue,
        middleware: MiddlewareQueue,
    ) -> Result<Dispatcher, FactoryError> {
        let handler = self.resolve(handler).into_handler();
        self.delegate.create(handler, middleware)
    }
}

impl<F> std::fmt::Debug for ActionResolver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionResolver")
            .field("catalog", &self.catalog)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Layer
// ============================================================================

/// [`Layer`] wrapping a factory in an [`ActionResolver`].
#[derive(Clone)]
pub struct ActionResolverLayer {
    container: BoxedContainer,
    catalog: Arc<ActionCatalog>,
    sources: InputSources,
}

impl ActionResolverLayer {
    /// Creates a layer with the default input sources.
    pub fn new(container: BoxedContainer, catalog: Arc<ActionCatalog>) -> Self {
        Self {
            container,
            catalog,
            sources: InputSources::default(),
        }
    }

    /// Sets the input sources passed on to the resolver.
    pub fn with_input_sources(mut self, sources: InputSources) -> Self {
        self.sources = sources;
        self
    }
}

impl<F> Layer<F> for ActionResolverLayer {
    type Service = ActionResolver<F>;

    fn layer(&self, inner: F) -> Self::Service {
        ActionResolver::new(Arc::clone(&self.container), Arc::clone(&self.catalog), inner)
            .with_input_sources(self.sources)
    }
}
