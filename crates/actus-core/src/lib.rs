//! # actus-core
//!
//! Request handling and dispatch primitives for the actus framework.
//!
//! This layer provides:
//! - HTTP message aliases and route attributes ([`message`])
//! - A dependency container ([`container`])
//! - The [`RequestHandler`] and [`Middleware`] traits
//! - Handler and middleware values as accepted by factories ([`value`])
//! - The [`Dispatcher`] and the [`DispatcherFactory`] decorator chain
//!
//! Nothing here knows about actions, domains or responders; those live in
//! `actus-framework`, which plugs into the factory chain defined here.

pub mod container;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod handler;
pub mod message;
pub mod middleware;
pub mod value;

pub use container::{BoxedContainer, Container, ServiceArc, ServiceContainer, get_as};
pub use dispatcher::Dispatcher;
pub use error::{ContainerError, FactoryError, HandlerError, HandlerResult};
pub use factory::{
    BasicDispatcherFactory, BoxedDispatcherFactory, ContainerResolver, DispatcherFactory,
    FactoryFn, factory_fn,
};
pub use handler::{BoxedRequestHandler, HandlerFn, RequestHandler, handler_fn};
pub use message::{Body, Request, RequestExt, Response, RouteAttributes};
pub use middleware::{BoxedMiddleware, Middleware, Next};
pub use value::{HandlerValue, MiddlewareQueue, MiddlewareValue};
