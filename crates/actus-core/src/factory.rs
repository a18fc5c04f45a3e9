//! Dispatcher factories.
//!
//! A [`DispatcherFactory`] turns a [`HandlerValue`] and a [`MiddlewareQueue`]
//! into a [`Dispatcher`]. Factories compose by decoration: a resolver
//! implements `DispatcherFactory` itself, rewrites the values it recognizes and
//! forwards everything to the factory it wraps. The innermost factory,
//! [`BasicDispatcherFactory`], only accepts already-built instances.
//!
//! ```text
//! ActionResolver ──▶ ContainerResolver ──▶ BasicDispatcherFactory ──▶ Dispatcher
//! ```

use std::sync::Arc;

use tracing::trace;

use crate::container::{BoxedContainer, get_as};
use crate::dispatcher::Dispatcher;
use crate::error::FactoryError;
use crate::handler::BoxedRequestHandler;
use crate::middleware::BoxedMiddleware;
use crate::value::{HandlerValue, MiddlewareQueue, MiddlewareValue};

/// Produces dispatchers from handler and middleware values.
pub trait DispatcherFactory: Send + Sync {
    /// Builds a dispatcher for `handler` wrapped in `middleware`.
    fn create(
        &self,
        handler: HandlerValue,
        middleware: MiddlewareQueue,
    ) -> Result<Dispatcher, FactoryError>;

    /// Builds a dispatcher for `handler` with no middleware.
    fn create_default(&self, handler: HandlerValue) -> Result<Dispatcher, FactoryError> {
        self.create(handler, MiddlewareQueue::new())
    }
}

impl<F: DispatcherFactory + ?Sized> DispatcherFactory for Arc<F> {
    fn create(
        &self,
        handler: HandlerValue,
        middleware: MiddlewareQueue,
    ) -> Result<Dispatcher, FactoryError> {
        (**self).create(handler, middleware)
    }
}

impl<F: DispatcherFactory + ?Sized> DispatcherFactory for Box<F> {
    fn create(
        &self,
        handler: HandlerValue,
        middleware: MiddlewareQueue,
    ) -> Result<Dispatcher, FactoryError> {
        (**self).create(handler, middleware)
    }
}

/// A shared, type-erased dispatcher factory.
pub type BoxedDispatcherFactory = Arc<dyn DispatcherFactory>;

/// Adapter running a closure as a [`DispatcherFactory`].
#[derive(Clone)]
pub struct FactoryFn<F> {
    f: F,
}

impl<F> DispatcherFactory for FactoryFn<F>
where
    F: Fn(HandlerValue, MiddlewareQueue) -> Result<Dispatcher, FactoryError> + Send + Sync,
{
    fn create(
        &self,
        handler: HandlerValue,
        middleware: MiddlewareQueue,
    ) -> Result<Dispatcher, FactoryError> {
        (self.f)(handler, middleware)
    }
}

/// Wraps a closure into a [`DispatcherFactory`].
pub fn factory_fn<F>(f: F) -> FactoryFn<F>
where
    F: Fn(HandlerValue, MiddlewareQueue) -> Result<Dispatcher, FactoryError> + Send + Sync,
{
    FactoryFn { f }
}

// ============================================================================
// BasicDispatcherFactory
// ============================================================================

/// The innermost factory: accepts instances only.
///
/// Anything still in `Named` or `Sequence` form at this point was not
/// recognized by any resolver in front of it and is reported as unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicDispatcherFactory;

impl BasicDispatcherFactory {
    pub fn new() -> Self {
        Self
    }
}

impl DispatcherFactory for BasicDispatcherFactory {
    fn create(
        &self,
        handler: HandlerValue,
        middleware: MiddlewareQueue,
    ) -> Result<Dispatcher, FactoryError> {
        let handler: BoxedRequestHandler = match handler {
            HandlerValue::Instance(handler) => handler,
            other => return Err(FactoryError::UnresolvedHandler(format!("{other:?}"))),
        };

        let middleware = middleware
            .into_iter()
            .enumerate()
            .map(|(position, value)| match value {
                MiddlewareValue::Instance(middleware) => Ok(middleware),
                other => Err(FactoryError::UnresolvedMiddleware {
                    position,
                    value: format!("{other:?}"),
                }),
            })
            .collect::<Result<Vec<BoxedMiddleware>, _>>()?;

        Ok(Dispatcher::new(handler, middleware))
    }
}

// ============================================================================
// ContainerResolver
// ============================================================================

/// Resolves `Named` handlers and middleware through the container.
///
/// A name is replaced with the [`BoxedRequestHandler`] or [`BoxedMiddleware`]
/// registered under it. Names the container does not know are forwarded
/// unchanged; entries of the wrong type are reported as container errors.
pub struct ContainerResolver<F> {
    container: BoxedContainer,
    delegate: F,
}

impl<F> ContainerResolver<F> {
    /// Creates a resolver in front of `delegate`.
    pub fn new(container: BoxedContainer, delegate: F) -> Self {
        Self {
            container,
            delegate,
        }
    }

    /// Returns the wrapped factory.
    pub fn delegate(&self) -> &F {
        &self.delegate
    }

    fn resolve_handler(&self, handler: HandlerValue) -> Result<HandlerValue, FactoryError> {
        match handler {
            HandlerValue::Named(id) if self.container.has(&id) => {
                trace!(id = %id, "Resolving request handler from container");
                let handler = get_as::<BoxedRequestHandler>(self.container.as_ref(), &id)?;
                Ok(HandlerValue::Instance(Arc::clone(&handler)))
            }
            other => Ok(other),
        }
    }

    fn resolve_middleware(&self, value: MiddlewareValue) -> Result<MiddlewareValue, FactoryError> {
        match value {
            MiddlewareValue::Named(id) if self.container.has(&id) => {
                trace!(id = %id, "Resolving middleware from container");
                let middleware = get_as::<BoxedMiddleware>(self.container.as_ref(), &id)?;
                Ok(MiddlewareValue::Instance(Arc::clone(&middleware)))
            }
            other => Ok(other),
        }
    }
}

impl<F: DispatcherFactory> DispatcherFactory for ContainerResolver<F> {
    fn create(
        &self,
        handler: HandlerValue,
        middleware: MiddlewareQueue,
    ) -> Result<Dispatcher, FactoryError> {
        let handler = self.resolve_handler(handler)?;
        let middleware = middleware
            .into_iter()
            .map(|value| self.resolve_middleware(value))
            .collect::<Result<MiddlewareQueue, _>>()?;

        self.delegate.create(handler, middleware)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ServiceContainer;
    use crate::error::{ContainerError, HandlerError};
    use crate::handler::handler_fn;
    use crate::message::{Body, Request, Response};
    use crate::middleware::{Middleware, Next};
    use async_trait::async_trait;
    use serde_json::json;

    struct Passthrough;

    #[async_trait]
    impl Middleware for Passthrough {
        async fn process(
            &self,
            request: Request,
            next: Next<'_>,
        ) -> Result<Response, HandlerError> {
            next.run(request).await
        }
    }

    fn ok_handler() -> BoxedRequestHandler {
        handler_fn(|_req| async { Ok(Response::new(Body::from_static(b"ok"))) })
    }

    #[test]
    fn test_basic_factory_accepts_instances() {
        let handler = ok_handler();
        let dispatcher = BasicDispatcherFactory
            .create(
                HandlerValue::Instance(Arc::clone(&handler)),
                vec![MiddlewareValue::instance(Passthrough)],
            )
            .unwrap();

        assert!(Arc::ptr_eq(dispatcher.handler(), &handler));
        assert_eq!(dispatcher.middleware().len(), 1);
    }

    #[test]
    fn test_basic_factory_rejects_named_handler() {
        let err = BasicDispatcherFactory
            .create_default(HandlerValue::from("home"))
            .unwrap_err();
        assert!(matches!(err, FactoryError::UnresolvedHandler(_)));
    }

    #[test]
    fn test_basic_factory_rejects_sequence_handler() {
        let err = BasicDispatcherFactory
            .create_default(HandlerValue::from(vec![json!("a"), json!("b")]))
            .unwrap_err();
        assert!(matches!(err, FactoryError::UnresolvedHandler(_)));
    }

    #[test]
    fn test_basic_factory_reports_middleware_position() {
        let err = BasicDispatcherFactory
            .create(
                HandlerValue::Instance(ok_handler()),
                vec![MiddlewareValue::instance(Passthrough), "auth".into()],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            FactoryError::UnresolvedMiddleware { position: 1, .. }
        ));
    }

    #[test]
    fn test_container_resolver_resolves_names() {
        let handler = ok_handler();
        let middleware: BoxedMiddleware = Arc::new(Passthrough);

        let mut container = ServiceContainer::new();
        container
            .instance("home", Arc::clone(&handler))
            .instance("auth", Arc::clone(&middleware));

        let resolver = ContainerResolver::new(Arc::new(container), BasicDispatcherFactory);
        let dispatcher = resolver
            .create(HandlerValue::from("home"), vec!["auth".into()])
            .unwrap();

        assert!(Arc::ptr_eq(dispatcher.handler(), &handler));
        assert!(Arc::ptr_eq(&dispatcher.middleware()[0], &middleware));
    }

    #[test]
    fn test_container_resolver_forwards_unknown_names() {
        let resolver =
            ContainerResolver::new(Arc::new(ServiceContainer::new()), BasicDispatcherFactory);

        let err = resolver.create_default(HandlerValue::from("missing")).unwrap_err();
        assert!(matches!(err, FactoryError::UnresolvedHandler(v) if v.contains("missing")));
    }

    #[test]
    fn test_container_resolver_reports_wrong_type() {
        let mut container = ServiceContainer::new();
        container.instance("home", String::from("not a handler"));

        let resolver = ContainerResolver::new(Arc::new(container), BasicDispatcherFactory);
        let err = resolver.create_default(HandlerValue::from("home")).unwrap_err();

        assert!(matches!(
            err,
            FactoryError::Container(ContainerError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_factory_fn() {
        let factory = factory_fn(|handler, middleware| {
            BasicDispatcherFactory.create(handler, middleware)
        });

        assert!(factory.create_default(HandlerValue::Instance(ok_handler())).is_ok());
    }
}
