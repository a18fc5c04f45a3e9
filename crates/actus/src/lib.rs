//! # actus
//!
//! Action-Domain-Responder request dispatch.
//!
//! Routes name their handlers with action definitions:
//!
//! | handler value                          | meaning                                   |
//! |----------------------------------------|-------------------------------------------|
//! | `"blog.list"`                          | domain, default responder, no input       |
//! | `["blog.list", "blog.html"]`           | domain and responder                      |
//! | `["blog.list", "blog.html", {"n": 5}]` | domain, responder and default input       |
//!
//! Anything that is not a valid definition is left to the rest of the factory
//! chain, which resolves names through the service container.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use actus::prelude::*;
//!
//! struct Ping;
//!
//! #[async_trait]
//! impl Domain for Ping {
//!     async fn call(&self, _input: Input) -> Result<Payload, HandlerError> {
//!         Ok(Payload::success("pong"))
//!     }
//! }
//!
//! let kernel = Kernel::builder().domain("ping", |_| Ok(Ping))?.build()?;
//! let response = kernel.handle("ping", vec![], request).await?;
//! ```
//!
//! # Crates
//!
//! - [`core`]: messages, container, handlers, middleware, dispatcher factories
//! - [`framework`]: domains, responders, the catalog and the action resolver
//! - [`runtime`]: configuration, logging and the [`Kernel`](runtime::Kernel)

pub use actus_core as core;
pub use actus_framework as framework;
pub use actus_runtime as runtime;

pub use actus_core::{
    Dispatcher, DispatcherFactory, HandlerValue, MiddlewareValue, Request, RequestHandler,
    Response,
};
pub use actus_framework::{ActionCatalog, ActionResolver, Domain, Input, Payload, Responder};
pub use actus_runtime::{ActusConfig, Kernel};

/// Everything an application usually needs.
pub mod prelude {
    pub use async_trait::async_trait;

    pub use actus_core::{
        Body, BoxedContainer, Container, ContainerError, Dispatcher, DispatcherFactory,
        HandlerError, HandlerValue, Middleware, MiddlewareQueue, MiddlewareValue, Next, Request,
        RequestExt, RequestHandler, Response, RouteAttributes, ServiceContainer, get_as,
        handler_fn,
    };
    pub use actus_framework::{
        ActionCatalog, ActionRequestHandler, ActionResolver, DEFAULT_RESPONDER, Domain, Input,
        InputSources, JsonResponder, Payload, PayloadStatus, Responder,
    };
    pub use actus_runtime::prelude::*;
    pub use actus_runtime::{ActusConfig, Kernel, KernelBuilder, RuntimeError, RuntimeResult};
}
