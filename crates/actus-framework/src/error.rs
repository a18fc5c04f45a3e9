//! Error types for the actus framework.

use thiserror::Error;

/// Errors raised while registering domains and responders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The identifier is empty.
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    /// The identifier is one of the marker identifiers.
    #[error("identifier '{0}' is reserved")]
    Reserved(String),

    /// A domain is already registered under the identifier.
    #[error("domain '{0}' is already registered")]
    DuplicateDomain(String),

    /// A responder is already registered under the identifier.
    #[error("responder '{0}' is already registered")]
    DuplicateResponder(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
