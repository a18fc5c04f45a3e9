//! Configuration loader using figment.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Programmatic defaults passed to [`ConfigLoader::merge`]
//! 3. Profile-specific config file (`actus.{profile}.toml`)
//! 4. Main config file (`actus.toml`)
//! 5. Environment variables (`ACTUS_*`)
//!
//! Each search directory is tried in turn for `actus.*`, then `config.*`.
//! The first main file found ends the search; its profile variant is only
//! read from the same directory, and only when the main file exists.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: TOML files (`actus.toml`, `config.toml`)
//! - `yaml-config`: YAML files (`actus.yaml`, `actus.yml`, ...)
//!
//! # Environment Variable Mapping
//!
//! Variables use the `ACTUS_` prefix with `__` as the nesting separator:
//!
//! - `ACTUS_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `ACTUS_ACTION__BODY=false` → `action.body = false`
//! - `ACTUS_RESPONDER__PRETTY=true` → `responder.pretty = true`
//!
//! ```rust,ignore
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace};

use super::error::{ConfigError, ConfigResult};
use super::schema::ActusConfig;

/// Environment variable selecting the profile.
const PROFILE_VAR: &str = "ACTUS_PROFILE";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name; `dev` and `prod` are accepted as short forms.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads the profile from `ACTUS_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loads the configuration from the default locations.
pub fn load_config() -> ConfigResult<ActusConfig> {
    ConfigLoader::new().load()
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader with the profile taken from the environment.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a search path for configuration files.
    ///
    /// Once any path is added the default locations are no longer searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges programmatic settings over the built-in defaults.
    pub fn merge(mut self, config: ActusConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<ActusConfig> {
        let profile = self.profile.clone();
        let config: ActusConfig = self.build_figment()?.extract()?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            "Configuration loaded"
        );

        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(ActusConfig::default()));
        figment = figment.merge(std::mem::take(&mut self.figment));

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            let format = FileFormat::from_path(path).ok_or_else(|| {
                ConfigError::ParseError(format!(
                    "unsupported or disabled configuration file format: {}",
                    path.display()
                ))
            })?;
            info!(path = %path.display(), "Loading configuration file");
            figment = format.merge(figment, path);
        } else {
            figment = self.search_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with ACTUS_ prefix");
            figment = figment.merge(Env::prefixed("ACTUS_").split("__"));
        }

        Ok(figment)
    }

    fn search_files(&self, mut figment: Figment) -> Figment {
        for dir in self.resolve_search_paths() {
            for stem in FILE_STEMS {
                for &format in FileFormat::ENABLED {
                    for ext in format.extensions() {
                        let main = dir.join(format!("{stem}.{ext}"));
                        if !main.is_file() {
                            continue;
                        }

                        let profiled = dir.join(format!("{stem}.{}.{ext}", self.profile));
                        if profiled.is_file() {
                            debug!(path = %profiled.display(), "Loading profile-specific config");
                            figment = format.merge(figment, &profiled);
                        }
                        info!(path = %main.display(), "Loading configuration file");
                        return format.merge(figment, &main);
                    }
                }
            }
        }

        debug!("No configuration file found, using defaults");
        figment
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }

        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("actus"));
        }
        paths
    }
}

/// File stems searched in every directory, in order.
const FILE_STEMS: &[&str] = &["actus", "config"];

/// A configuration file format compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl FileFormat {
    const ENABLED: &'static [Self] = &[
        #[cfg(feature = "toml-config")]
        Self::Toml,
        #[cfg(feature = "yaml-config")]
        Self::Yaml,
    ];

    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ENABLED
            .iter()
            .copied()
            .find(|format| format.extensions().contains(&ext))
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => &["toml"],
            #[cfg(feature = "yaml-config")]
            Self::Yaml => &["yaml", "yml"],
        }
    }

    fn merge(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => figment.merge(Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => figment.merge(Yaml::file(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        Jail::expect_with(|jail| {
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config, ActusConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(Profile::parse("prod"), Profile::Production);
        assert_eq!(Profile::parse("Development"), Profile::Development);
        assert_eq!(Profile::parse("staging"), Profile::Custom("staging".into()));
    }

    #[test]
    fn test_profile_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env(PROFILE_VAR, "production");
            assert_eq!(Profile::from_env(), Profile::Production);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("ACTUS_LOGGING__LEVEL", "debug");
            jail.set_env("ACTUS_ACTION__QUERY", "false");
            jail.set_env("ACTUS_RESPONDER__PRETTY", "true");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level, LogLevel::Debug);
            assert!(!config.action.query);
            assert!(config.action.body);
            assert!(config.responder.pretty);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::new()
            .file("/nonexistent/actus.toml")
            .without_env()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        Jail::expect_with(|jail| {
            jail.create_file("actus.ini", "level = debug")?;

            let err = ConfigLoader::new()
                .file(jail.directory().join("actus.ini"))
                .load()
                .unwrap_err();
            assert!(matches!(err, ConfigError::ParseError(_)));
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_file_and_profile_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "actus.toml",
                r#"
                [logging]
                level = "warn"

                [action]
                attributes = false
                "#,
            )?;
            jail.create_file(
                "actus.production.toml",
                r#"
                [logging]
                level = "error"
                thread_ids = true
                "#,
            )?;
            jail.set_env("ACTUS_RESPONDER__PRETTY", "true");

            let config = ConfigLoader::new()
                .profile("prod")
                .search_path(jail.directory())
                .load()
                .map_err(|e| e.to_string())?;

            // Main file wins over the profile file, env wins over both.
            assert_eq!(config.logging.level, LogLevel::Warn);
            assert!(config.logging.thread_ids);
            assert!(!config.action.attributes);
            assert!(config.responder.pretty);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_config_stem_and_orphan_profile_file() {
        Jail::expect_with(|jail| {
            jail.create_file("actus.production.toml", "[logging]\nlevel = \"error\"")?;
            jail.create_dir("fallback")?;
            jail.create_file("fallback/config.toml", "[logging]\nlevel = \"debug\"")?;

            let config = ConfigLoader::new()
                .profile("production")
                .search_path(jail.directory())
                .search_path(jail.directory().join("fallback"))
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level, LogLevel::Debug);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_file_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("conf/actus.toml")),
            Some(FileFormat::Toml)
        );
        assert_eq!(FileFormat::from_path(Path::new("actus.ini")), None);
        assert_eq!(FileFormat::from_path(Path::new("actus")), None);
    }
}
