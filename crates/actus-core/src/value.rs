//! Handler and middleware values as accepted by dispatcher factories.
//!
//! A factory does not only accept ready-made handlers: applications may hand
//! it an identifier or a loose sequence of values and leave it to resolvers
//! stacked in front of the factory to turn those into something runnable.
//! [`HandlerValue`] and [`MiddlewareValue`] carry whichever form was given.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::handler::{BoxedRequestHandler, RequestHandler};
use crate::middleware::{BoxedMiddleware, Middleware};

/// A request handler in any of the forms a dispatcher factory accepts.
#[derive(Clone)]
pub enum HandlerValue {
    /// A single identifier.
    Named(String),
    /// An ordered sequence of loose values.
    Sequence(Vec<Value>),
    /// An already-built handler.
    Instance(BoxedRequestHandler),
}

impl HandlerValue {
    /// Wraps a concrete handler.
    pub fn instance<H: RequestHandler>(handler: H) -> Self {
        Self::Instance(Arc::new(handler))
    }

    /// Returns the built handler, if this is one.
    pub fn as_instance(&self) -> Option<&BoxedRequestHandler> {
        match self {
            Self::Instance(handler) => Some(handler),
            _ => None,
        }
    }

    /// Returns the concrete handler type, if this is an instance of `H`.
    pub fn downcast_ref<H: RequestHandler>(&self) -> Option<&H> {
        self.as_instance()
            .and_then(|handler| handler.as_any().downcast_ref::<H>())
    }
}

/// Instances compare by identity, everything else by value.
impl PartialEq for HandlerValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Named(a), Self::Named(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Instance(a), Self::Instance(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for HandlerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(id) => f.debug_tuple("Named").field(id).finish(),
            Self::Sequence(values) => f.debug_tuple("Sequence").field(values).finish(),
            Self::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}

impl From<&str> for HandlerValue {
    fn from(id: &str) -> Self {
        Self::Named(id.to_string())
    }
}

impl From<String> for HandlerValue {
    fn from(id: String) -> Self {
        Self::Named(id)
    }
}

impl From<Vec<Value>> for HandlerValue {
    fn from(values: Vec<Value>) -> Self {
        Self::Sequence(values)
    }
}

impl From<BoxedRequestHandler> for HandlerValue {
    fn from(handler: BoxedRequestHandler) -> Self {
        Self::Instance(handler)
    }
}

/// A middleware in any of the forms a dispatcher factory accepts.
#[derive(Clone)]
pub enum MiddlewareValue {
    /// A single identifier.
    Named(String),
    /// An already-built middleware.
    Instance(BoxedMiddleware),
}

impl MiddlewareValue {
    /// Wraps a concrete middleware.
    pub fn instance<M: Middleware>(middleware: M) -> Self {
        Self::Instance(Arc::new(middleware))
    }
}

impl PartialEq for MiddlewareValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Named(a), Self::Named(b)) => a == b,
            (Self::Instance(a), Self::Instance(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for MiddlewareValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(id) => f.debug_tuple("Named").field(id).finish(),
            Self::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}

impl From<&str> for MiddlewareValue {
    fn from(id: &str) -> Self {
        Self::Named(id.to_string())
    }
}

impl From<String> for MiddlewareValue {
    fn from(id: String) -> Self {
        Self::Named(id)
    }
}

impl From<BoxedMiddleware> for MiddlewareValue {
    fn from(middleware: BoxedMiddleware) -> Self {
        Self::Instance(middleware)
    }
}

/// The ordered middleware list handed to a dispatcher factory.
pub type MiddlewareQueue = Vec<MiddlewareValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::message::{Body, Response};
    use serde_json::json;

    #[test]
    fn test_instances_compare_by_identity() {
        let handler = handler_fn(|_req| async { Ok(Response::new(Body::new())) });
        let same = HandlerValue::Instance(Arc::clone(&handler));
        let other = HandlerValue::Instance(handler_fn(|_req| async {
            Ok(Response::new(Body::new()))
        }));

        assert_eq!(HandlerValue::Instance(handler), same);
        assert_ne!(same, other);
    }

    #[test]
    fn test_values_compare_by_value() {
        assert_eq!(HandlerValue::from("a"), HandlerValue::Named("a".into()));
        assert_eq!(
            HandlerValue::from(vec![json!("a"), json!({"k": 1})]),
            HandlerValue::Sequence(vec![json!("a"), json!({"k": 1})])
        );
        assert_ne!(HandlerValue::from("a"), HandlerValue::from(vec![json!("a")]));
    }

    #[test]
    fn test_debug_hides_instances() {
        let handler = handler_fn(|_req| async { Ok(Response::new(Body::new())) });
        assert_eq!(format!("{:?}", HandlerValue::from(handler)), "Instance(..)");
        assert_eq!(
            format!("{:?}", MiddlewareValue::from("auth")),
            "Named(\"auth\")"
        );
    }
}
