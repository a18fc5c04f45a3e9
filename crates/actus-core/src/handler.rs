//! Request handlers.
//!
//! A [`RequestHandler`] turns a [`Request`] into a [`Response`]. Plain async
//! closures can be used as handlers through [`handler_fn`].

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::message::{Request, Response};

/// Something that produces a response for a request.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    /// Handles the request.
    async fn handle(&self, request: Request) -> Result<Response, HandlerError>;

    /// Returns this handler as [`Any`] so callers can recover the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// A shared, type-erased request handler.
pub type BoxedRequestHandler = Arc<dyn RequestHandler>;

/// Adapter running an async closure as a [`RequestHandler`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> RequestHandler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
{
    async fn handle(&self, request: Request) -> Result<Response, HandlerError> {
        (self.f)(request).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Wraps an async closure into a [`BoxedRequestHandler`].
///
/// ```rust,ignore
/// let handler = handler_fn(|_req| async { Ok(Response::new(Body::from("pong"))) });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> BoxedRequestHandler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
{
    Arc::new(HandlerFn { f })
}
