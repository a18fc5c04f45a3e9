//! Runtime error types.

use thiserror::Error;

use actus_core::{FactoryError, HandlerError};
use actus_framework::CatalogError;

use crate::config::ConfigError;

/// Errors that can occur while building or running a kernel.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A domain or responder could not be registered.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// No dispatcher could be built for a handler.
    #[error("Dispatcher error: {0}")]
    Factory(#[from] FactoryError),

    /// The request handler failed.
    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
