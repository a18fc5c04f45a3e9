//! Middleware and the chain that runs it.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::HandlerError;
use crate::handler::RequestHandler;
use crate::message::{Request, Response};

/// A processing step wrapped around a request handler.
///
/// Implementations either answer the request themselves or forward it with
/// [`Next::run`].
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    /// Processes the request, optionally delegating to the rest of the chain.
    async fn process(&self, request: Request, next: Next<'_>) -> Result<Response, HandlerError>;
}

/// A shared, type-erased middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The remainder of a middleware chain.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    middleware: &'a [BoxedMiddleware],
    handler: &'a dyn RequestHandler,
}

impl<'a> Next<'a> {
    /// Creates a chain running `middleware` front to back, then `handler`.
    pub fn new(middleware: &'a [BoxedMiddleware], handler: &'a dyn RequestHandler) -> Self {
        Self {
            middleware,
            handler,
        }
    }

    /// Runs the rest of the chain.
    pub fn run(self, request: Request) -> BoxFuture<'a, Result<Response, HandlerError>> {
        Box::pin(async move {
            match self.middleware.split_first() {
                Some((first, rest)) => {
                    let next = Next {
                        middleware: rest,
                        handler: self.handler,
                    };
                    first.process(request, next).await
                }
                None => self.handler.handle(request).await,
            }
        })
    }

    /// Number of middleware left before the handler.
    pub fn remaining(&self) -> usize {
        self.middleware.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::message::Body;
    use http::HeaderValue;

    struct Tag(&'static str);

    #[async_trait]
    impl Middleware for Tag {
        async fn process(
            &self,
            request: Request,
            next: Next<'_>,
        ) -> Result<Response, HandlerError> {
            let mut response = next.run(request).await?;
            response
                .headers_mut()
                .append("x-trace", HeaderValue::from_static(self.0));
            Ok(response)
        }
    }

    struct ShortCircuit;

    #[async_trait]
    impl Middleware for ShortCircuit {
        async fn process(
            &self,
            _request: Request,
            _next: Next<'_>,
        ) -> Result<Response, HandlerError> {
            Ok(Response::new(Body::from_static(b"blocked")))
        }
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let handler = handler_fn(|_req| async { Ok(Response::new(Body::from_static(b"ok"))) });
        let middleware: Vec<BoxedMiddleware> = vec![Arc::new(Tag("outer")), Arc::new(Tag("inner"))];

        let response = Next::new(&middleware, handler.as_ref())
            .run(Request::new(Body::new()))
            .await
            .unwrap();

        // Responses unwind from the innermost layer outward.
        let tags: Vec<_> = response
            .headers()
            .get_all("x-trace")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(tags, vec!["inner", "outer"]);
        assert_eq!(response.body().as_ref(), b"ok");
    }

    #[tokio::test]
    async fn test_middleware_can_short_circuit() {
        let handler = handler_fn(|_req| async { Err(HandlerError::custom("unreachable")) });
        let middleware: Vec<BoxedMiddleware> = vec![Arc::new(ShortCircuit)];

        let response = Next::new(&middleware, handler.as_ref())
            .run(Request::new(Body::new()))
            .await
            .unwrap();

        assert_eq!(response.body().as_ref(), b"blocked");
    }
}
