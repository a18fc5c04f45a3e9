//! actus runtime - configuration, logging and application wiring.
//!
//! This crate provides:
//! - Layered configuration loading (`ActusConfig`, `ConfigLoader`)
//! - Logging setup on `tracing-subscriber` (`LoggingBuilder`)
//! - The [`Kernel`], which owns the service container and the action catalog
//!   and dispatches through the action resolver chain
//!
//! ```rust,ignore
//! use actus_runtime::Kernel;
//!
//! let kernel = Kernel::builder()
//!     .domain("ping", |_| Ok(Ping))?
//!     .build()?;
//! kernel.init_logging();
//!
//! let response = kernel.handle("ping", vec![], request).await?;
//! ```

pub mod config;
pub mod error;
pub mod kernel;
pub mod logging;

pub use config::{ActusConfig, ConfigError, ConfigLoader, ConfigResult, LoggingConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use kernel::{Kernel, KernelBuilder, KernelFactory};
pub use logging::{LoggingBuilder, SpanEvents};

pub use tracing;
pub use tracing_subscriber;

/// Logging macros for application code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
