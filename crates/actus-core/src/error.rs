//! Error types for the actus core.

use thiserror::Error;

/// Errors raised by a [`Container`](crate::container::Container) lookup.
#[derive(Debug, Clone, Error)]
pub enum ContainerError {
    /// Nothing is registered under the identifier.
    #[error("no entry registered for '{0}'")]
    NotFound(String),

    /// The entry exists but holds a different type.
    #[error("entry '{id}' is not a '{expected}'")]
    TypeMismatch {
        /// Identifier that was looked up.
        id: String,
        /// Name of the requested type.
        expected: &'static str,
    },

    /// A factory failed to build the entry.
    #[error("failed to build '{id}': {reason}")]
    Build {
        /// Identifier of the entry being built.
        id: String,
        /// Why the build failed.
        reason: String,
    },
}

impl ContainerError {
    /// Creates a build error for `id`.
    pub fn build(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Build {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Errors produced while a request is being handled.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A collaborator could not be obtained from the container.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// The request could not be turned into handler input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The HTTP response could not be assembled.
    #[error("failed to build response: {0}")]
    Http(#[from] http::Error),

    /// Custom handler error.
    #[error("{0}")]
    Custom(String),
}

impl HandlerError {
    /// Creates a custom handler error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Creates a bad request error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

/// Errors raised while a dispatcher factory builds a [`Dispatcher`](crate::dispatcher::Dispatcher).
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The handler value is not something the factory can run.
    #[error("unresolved request handler: {0}")]
    UnresolvedHandler(String),

    /// A middleware value is not something the factory can run.
    #[error("unresolved middleware at position {position}: {value}")]
    UnresolvedMiddleware {
        /// Index in the middleware queue.
        position: usize,
        /// Debug rendering of the offending value.
        value: String,
    },

    /// The container failed while resolving a named value.
    #[error(transparent)]
    Container(#[from] ContainerError),
}

/// Result type for request handling.
pub type HandlerResult<T> = Result<T, HandlerError>;
