//! HTTP message types shared by handlers, middleware and responders.

use std::collections::BTreeMap;

use bytes::Bytes;

/// Body type carried by requests and responses.
pub type Body = Bytes;

/// An incoming HTTP request.
pub type Request = http::Request<Body>;

/// An outgoing HTTP response.
pub type Response = http::Response<Body>;

/// Route parameters attached to a request by whatever routed it.
///
/// Stored in the request extensions. Handlers that build input from the
/// request read them from there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteAttributes(BTreeMap<String, String>);

impl RouteAttributes {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute (builder pattern).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Inserts an attribute, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the attribute value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterates over attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RouteAttributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Extension methods for reading actus data off a [`Request`].
pub trait RequestExt {
    /// Returns the route attributes, if a router attached any.
    fn route_attributes(&self) -> Option<&RouteAttributes>;
}

impl RequestExt for Request {
    fn route_attributes(&self) -> Option<&RouteAttributes> {
        self.extensions().get::<RouteAttributes>()
    }
}
