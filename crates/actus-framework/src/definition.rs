//! ADR action definitions.
//!
//! An action is defined either by a bare domain identifier or by a short
//! sequence `[domain, responder, input]` whose trailing parts may be left out:
//!
//! | handler value                      | definition                 |
//! |------------------------------------|----------------------------|
//! | `"blog.list"`                      | `Identifier("blog.list")`  |
//! | `["blog.list"]`                    | `Identifier("blog.list")`  |
//! | `["blog.list", "html"]`            | `Pair(..)`                 |
//! | `["blog.list", "html", {..}]`      | `Triple(..)`               |
//!
//! Positions past the third are ignored, so `[d, r, i, extra]` reads as
//! `Triple(d, r, i)`. Missing parts default to [`DEFAULT_RESPONDER`] and an
//! empty [`Input`]; so does a `null` in the responder or input position.
//! The domain position is never optional.

use serde_json::Value;

use actus_core::HandlerValue;

use crate::catalog::{ActionCatalog, DEFAULT_RESPONDER, DomainRef, ResponderRef};
use crate::domain::Input;

/// The shape of a candidate action definition, before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionDefinition<'a> {
    /// Domain only.
    Identifier(&'a str),
    /// Domain and responder.
    Pair(&'a Value, &'a Value),
    /// Domain, responder and default input.
    Triple(&'a Value, &'a Value, &'a Value),
}

impl<'a> ActionDefinition<'a> {
    /// Reads the definition shape out of a handler value.
    ///
    /// Returns `None` for values that cannot be a definition at all: built
    /// handler instances, empty sequences and one-element sequences whose
    /// element is not an identifier.
    pub fn from_handler(handler: &'a HandlerValue) -> Option<Self> {
        match handler {
            HandlerValue::Named(id) => Some(Self::Identifier(id)),
            HandlerValue::Sequence(parts) => Self::from_parts(parts),
            HandlerValue::Instance(_) => None,
        }
    }

    fn from_parts(parts: &'a [Value]) -> Option<Self> {
        match parts {
            [] => None,
            [domain] => domain.as_str().map(Self::Identifier),
            [domain, responder] => Some(Self::Pair(domain, responder)),
            [domain, responder, input, ..] => Some(Self::Triple(domain, responder, input)),
        }
    }

    /// Checks every part against `catalog`.
    ///
    /// Returns the validated parts only if the domain, the responder and the
    /// input are all acceptable; a single bad part rejects the whole
    /// definition.
    pub fn validate(&self, catalog: &ActionCatalog) -> Option<ActionParts> {
        let (domain, responder, input) = match *self {
            Self::Identifier(domain) => (
                catalog.domain(domain)?,
                catalog.default_responder(),
                Input::new(),
            ),
            Self::Pair(domain, responder) => (
                lookup_domain(catalog, domain)?,
                lookup_responder(catalog, responder)?,
                Input::new(),
            ),
            Self::Triple(domain, responder, input) => (
                lookup_domain(catalog, domain)?,
                lookup_responder(catalog, responder)?,
                read_input(input)?,
            ),
        };

        Some(ActionParts {
            domain: domain.clone(),
            responder: responder.clone(),
            input,
        })
    }
}

fn lookup_domain<'c>(catalog: &'c ActionCatalog, value: &Value) -> Option<&'c DomainRef> {
    value.as_str().and_then(|id| catalog.domain(id))
}

fn lookup_responder<'c>(catalog: &'c ActionCatalog, value: &Value) -> Option<&'c ResponderRef> {
    match value {
        Value::Null => Some(catalog.default_responder()),
        Value::String(id) if id == DEFAULT_RESPONDER => Some(catalog.default_responder()),
        Value::String(id) => catalog.responder(id),
        _ => None,
    }
}

fn read_input(value: &Value) -> Option<Input> {
    match value {
        Value::Null => Some(Input::new()),
        value => Input::from_value(value),
    }
}

/// A definition whose parts all passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionParts {
    pub domain: DomainRef,
    pub responder: ResponderRef,
    pub input: Input,
}
