//! Configuration validation utilities.

use tracing_subscriber::filter::Directive;

use super::error::{ConfigError, ConfigResult};
use super::schema::{ActusConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &ActusConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    for (module, level) in &logging.filters {
        if module.trim().is_empty() {
            return Err(ConfigError::validation("Log filter module must not be empty"));
        }
        let directive = format!("{module}={level}");
        if directive.parse::<Directive>().is_err() {
            return Err(ConfigError::validation(format!(
                "Invalid log filter directive: {directive}"
            )));
        }
    }

    if logging.output == LogOutput::File {
        let Some(path) = &logging.file_path else {
            return Err(ConfigError::validation(
                "File output requires logging.file_path",
            ));
        };
        if path.file_name().is_none() {
            return Err(ConfigError::validation(format!(
                "Log file path has no file name: {}",
                path.display()
            )));
        }
    }

    Ok(())
}
