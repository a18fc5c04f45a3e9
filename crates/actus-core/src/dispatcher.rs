//! Request dispatcher.
//!
//! A [`Dispatcher`] pairs a resolved request handler with its middleware
//! queue. Dispatching a request runs the middleware front to back and then the
//! handler:
//!
//! ```text
//! request ──▶ middleware[0] ──▶ middleware[1] ──▶ … ──▶ handler
//! response ◀─────────────────────────────────────────────┘
//! ```
//!
//! Dispatchers are cheap to clone and are `tower::Service<Request>`s, so they
//! can be served by anything that speaks tower.

use std::any::Any;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{Instrument, Level, debug, span, warn};

use crate::error::HandlerError;
use crate::handler::{BoxedRequestHandler, RequestHandler};
use crate::message::{Request, Response};
use crate::middleware::{BoxedMiddleware, Next};

struct Inner {
    handler: BoxedRequestHandler,
    middleware: Vec<BoxedMiddleware>,
}

/// A request handler wrapped in its middleware queue.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Creates a dispatcher running `middleware` in order, then `handler`.
    pub fn new(handler: BoxedRequestHandler, middleware: Vec<BoxedMiddleware>) -> Self {
        Self {
            inner: Arc::new(Inner {
                handler,
                middleware,
            }),
        }
    }

    /// Returns the innermost request handler.
    pub fn handler(&self) -> &BoxedRequestHandler {
        &self.inner.handler
    }

    /// Returns the middleware queue.
    pub fn middleware(&self) -> &[BoxedMiddleware] {
        &self.inner.middleware
    }

    /// Returns `true` if both dispatchers share the same state.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Dispatches a request through the middleware queue and the handler.
    pub async fn dispatch(&self, request: Request) -> Result<Response, HandlerError> {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            method = %request.method(),
            uri = %request.uri(),
            middleware = self.inner.middleware.len()
        );

        async move {
            let result = Next::new(&self.inner.middleware, self.inner.handler.as_ref())
                .run(request)
                .await;

            match &result {
                Ok(response) => debug!(status = %response.status(), "Request dispatched"),
                Err(e) => warn!("Request handling failed: {e}"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Dispatchers nest: a dispatcher is itself a request handler.
#[async_trait]
impl RequestHandler for Dispatcher {
    async fn handle(&self, request: Request) -> Result<Response, HandlerError> {
        self.dispatch(request).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl tower::Service<Request> for Dispatcher {
    type Response = Response;
    type Error = HandlerError;
    type Future = BoxFuture<'static, Result<Response, HandlerError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { dispatcher.dispatch(request).await })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("middleware_count", &self.inner.middleware.len())
            .finish_non_exhaustive()
    }
}
