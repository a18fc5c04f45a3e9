//! # actus-framework
//!
//! Action-Domain-Responder support for actus.
//!
//! An application registers its [`Domain`]s and [`Responder`]s in an
//! [`ActionCatalog`] and describes routes with action definitions such as
//! `"blog.list"` or `["blog.list", "blog.html", {"page": 1}]`. The
//! [`ActionResolver`] sits in front of a
//! [`DispatcherFactory`](actus_core::DispatcherFactory) and turns those
//! definitions into [`ActionRequestHandler`]s; anything else is left for the
//! factories behind it.
//!
//! ```rust,ignore
//! let factory = ActionResolver::new(container.clone(), catalog, ContainerResolver::new(
//!     container,
//!     BasicDispatcherFactory,
//! ));
//! let dispatcher = factory.create_default(HandlerValue::from("blog.list"))?;
//! ```

pub mod action;
pub mod catalog;
pub mod definition;
pub mod domain;
pub mod error;
pub mod resolver;
pub mod responder;

pub use action::{ActionRequestHandler, InputSources};
pub use catalog::{ActionCatalog, DEFAULT_RESPONDER, DOMAIN_MARKER, DomainRef, ResponderRef};
pub use definition::{ActionDefinition, ActionParts};
pub use domain::{BoxedDomain, Domain, Input, Payload, PayloadStatus};
pub use error::{CatalogError, CatalogResult};
pub use resolver::{ActionResolver, ActionResolverLayer, Resolution};
pub use responder::{BoxedResponder, JsonResponder, Responder};
