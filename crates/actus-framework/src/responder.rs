//! The responder side of an action.

use std::sync::Arc;

use http::header::{CONTENT_TYPE, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use actus_core::{HandlerError, Request, Response};

use crate::domain::Payload;

/// Turns a domain payload into an HTTP response.
pub trait Responder: Send + Sync + 'static {
    /// Builds the response for `payload`.
    ///
    /// The request is available for content negotiation and the like.
    fn respond(&self, request: &Request, payload: Payload) -> Result<Response, HandlerError>;
}

/// A shared, type-erased responder.
pub type BoxedResponder = Arc<dyn Responder>;

/// The default responder: renders payloads as JSON.
///
/// Successful payloads render their output as the body. Other payloads render
/// `{"status": …, "message": …, "output": …}` so clients can tell what went
/// wrong.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonResponder {
    /// Pretty-print the body.
    #[serde(default)]
    pub pretty: bool,
}

impl JsonResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables pretty-printing.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn render(&self, body: &Value) -> Result<Vec<u8>, HandlerError> {
        let rendered = if self.pretty {
            serde_json::to_vec_pretty(body)
        } else {
            serde_json::to_vec(body)
        };
        rendered.map_err(|e| HandlerError::custom(format!("failed to serialize payload: {e}")))
    }
}

impl Responder for JsonResponder {
    fn respond(&self, _request: &Request, payload: Payload) -> Result<Response, HandlerError> {
        let status = payload.status.status_code();
        let body = if payload.status.is_success() {
            payload.output
        } else {
            json!({
                "status": payload.status,
                "message": payload.message,
                "output": payload.output,
            })
        };

        let response = http::Response::builder()
            .status(status)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(self.render(&body)?.into())?;

        Ok(response)
    }
}
