//! The domain side of an action.
//!
//! A [`Domain`] receives the action [`Input`] and returns a [`Payload`]; it
//! knows nothing about HTTP. Turning the payload into a response is the
//! responder's job.

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use actus_core::HandlerError;

/// Domain logic behind an action.
#[async_trait]
pub trait Domain: Send + Sync + 'static {
    /// Runs the domain logic for `input`.
    async fn call(&self, input: Input) -> Result<Payload, HandlerError>;
}

/// A shared, type-erased domain.
pub type BoxedDomain = Arc<dyn Domain>;

// ============================================================================
// Input
// ============================================================================

/// Key/value input handed to a domain.
///
/// Built from the action's default input, overlaid with whatever the request
/// contributes (route attributes, query string, JSON body).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Input(Map<String, Value>);

impl Input {
    /// Creates an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a mapping out of a JSON value.
    ///
    /// Objects are taken as they are. Arrays are mappings keyed by position
    /// (`"0"`, `"1"`, …). Every other value is not a mapping and yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map.clone())),
            Value::Array(items) => Some(Self(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v.clone()))
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Inserts a value, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Adds a value (builder pattern).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Overlays `entries` on top of this input; later values win.
    pub fn merge<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.0.extend(entries);
    }

    /// Returns the raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Deserializes the value for `key`.
    ///
    /// Returns `None` when the key is absent or the value has the wrong shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Deserializes the whole input into `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| HandlerError::bad_request(format!("invalid input: {e}")))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Input {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Input> for Value {
    fn from(input: Input) -> Self {
        Value::Object(input.0)
    }
}

// ============================================================================
// Payload
// ============================================================================

/// Outcome category of a domain call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadStatus {
    Success,
    Created,
    Accepted,
    NotFound,
    NotValid,
    NotAuthorized,
    Error,
}

impl PayloadStatus {
    /// The HTTP status a responder should use for this outcome.
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,
            Self::Created => StatusCode::CREATED,
            Self::Accepted => StatusCode::ACCEPTED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NotValid => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotAuthorized => StatusCode::FORBIDDEN,
            Self::Error => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for the success family.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::Created | Self::Accepted)
    }
}

/// Result of a domain call, handed to the responder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Outcome category.
    pub status: PayloadStatus,
    /// Domain output.
    #[serde(default)]
    pub output: Value,
    /// Optional human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Payload {
    /// Creates a payload with the given status and output.
    pub fn new(status: PayloadStatus, output: impl Into<Value>) -> Self {
        Self {
            status,
            output: output.into(),
            message: None,
        }
    }

    pub fn success(output: impl Into<Value>) -> Self {
        Self::new(PayloadStatus::Success, output)
    }

    pub fn created(output: impl Into<Value>) -> Self {
        Self::new(PayloadStatus::Created, output)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(PayloadStatus::NotFound, Value::Null).with_message(message)
    }

    pub fn not_valid(errors: impl Into<Value>) -> Self {
        Self::new(PayloadStatus::NotValid, errors)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(PayloadStatus::Error, Value::Null).with_message(message)
    }

    /// Attaches a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
