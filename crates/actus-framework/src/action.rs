//! The request handler behind every resolved action.
//!
//! [`ActionRequestHandler`] is a uniform wrapper around a validated action
//! definition. Nothing is built up front: on each request it
//!
//! 1. assembles the domain [`Input`] from the default input and the request,
//! 2. builds the domain through its factory and calls it,
//! 3. builds the responder and hands it the resulting payload.
//!
//! Input sources are layered, later ones overriding earlier ones:
//!
//! ```text
//! default input < route attributes < query string < JSON body
//! ```

use std::any::Any;
use std::fmt;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{Instrument, debug, debug_span};

use actus_core::{BoxedContainer, HandlerError, Request, RequestExt, RequestHandler, Response};

use crate::catalog::{DomainRef, ResponderRef};
use crate::domain::Input;

/// Which parts of the request contribute to the domain input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSources {
    /// Route attributes attached to the request.
    pub attributes: bool,
    /// Query string parameters.
    pub query: bool,
    /// Top-level fields of a JSON object body.
    pub body: bool,
}

impl Default for InputSources {
    fn default() -> Self {
        Self {
            attributes: true,
            query: true,
            body: true,
        }
    }
}

impl InputSources {
    /// Only the default input; nothing is read from the request.
    pub const NONE: Self = Self {
        attributes: false,
        query: false,
        body: false,
    };
}

/// Runs one ADR action: domain in, payload out, responder renders.
#[derive(Clone)]
pub struct ActionRequestHandler {
    container: BoxedContainer,
    domain: DomainRef,
    responder: ResponderRef,
    input: Input,
    sources: InputSources,
}

impl ActionRequestHandler {
    /// Creates a handler for the given domain, responder and default input.
    pub fn new(
        container: BoxedContainer,
        domain: DomainRef,
        responder: ResponderRef,
        input: Input,
    ) -> Self {
        Self {
            container,
            domain,
            responder,
            input,
            sources: InputSources::default(),
        }
    }

    /// Selects which request parts feed the domain input.
    pub fn with_sources(mut self, sources: InputSources) -> Self {
        self.sources = sources;
        self
    }

    pub fn container(&self) -> &BoxedContainer {
        &self.container
    }

    pub fn domain(&self) -> &DomainRef {
        &self.domain
    }

    pub fn responder(&self) -> &ResponderRef {
        &self.responder
    }

    /// The default input the request input is layered over.
    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn sources(&self) -> InputSources {
        self.sources
    }

    /// Assembles the domain input for `request`.
    ///
    /// # Errors
    ///
    /// Fails with [`HandlerError::BadRequest`] when the request declares a JSON
    /// body that is malformed or not an object.
    pub fn build_input(&self, request: &Request) -> Result<Input, HandlerError> {
        let mut input = self.input.clone();

        if self.sources.attributes
            && let Some(attributes) = request.route_attributes()
        {
            input.merge(
                attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v.to_string()))),
            );
        }

        if self.sources.query
            && let Some(query) = request.uri().query()
        {
            input.merge(
                url::form_urlencoded::parse(query.as_bytes())
                    .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned()))),
            );
        }

        if self.sources.body && is_json(request) && !request.body().is_empty() {
            let body: Value = serde_json::from_slice(request.body())
                .map_err(|e| HandlerError::bad_request(format!("malformed JSON body: {e}")))?;
            match body {
                Value::Object(fields) => input.merge(fields),
                _ => return Err(HandlerError::bad_request("JSON body must be an object")),
            }
        }

        Ok(input)
    }
}

fn is_json(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

#[async_trait]
impl RequestHandler for ActionRequestHandler {
    async fn handle(&self, request: Request) -> Result<Response, HandlerError> {
        let span = debug_span!(
            "action",
            domain = %self.domain.id(),
            responder = %self.responder.id()
        );

        async move {
            let input = self.build_input(&request)?;

            let domain = self.domain.build(self.container.as_ref())?;
            let payload = domain.call(input).await?;
            debug!(status = ?payload.status, "Domain returned payload");

            let responder = self.responder.build(self.container.as_ref())?;
            responder.respond(&request, payload)
        }
        .instrument(span)
        .await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Two handlers are equal when they share a container and wrap the same
/// definition.
impl PartialEq for ActionRequestHandler {
    fn eq(&self, other: &Self) -> bool {
        std::sync::Arc::ptr_eq(&self.container, &other.container)
            && self.domain == other.domain
            && self.responder == other.responder
            && self.input == other.input
            && self.sources == other.sources
    }
}

impl fmt::Debug for ActionRequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRequestHandler")
            .field("domain", &self.domain)
            .field("responder", &self.responder)
            .field("input", &self.input)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}
