//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate.
//! Each sub-module represents a logical configuration section.

pub mod cache;
pub mod database;
pub mod logging;
pub mod token;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::cache::CacheConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::token::TokenConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// The top-level deserialization target for the merged configuration
/// files (default + environment overlay) and `WARDEN__*` variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Signed token settings.
    pub token: TokenConfig,
    /// Database connection settings. Absent when only the in-memory
    /// entity store is used.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Permission cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and the environment.
    ///
    /// Merges `config/default` with an environment-specific overlay and
    /// environment variables prefixed with `WARDEN__`, then validates.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(Path::new("config"), env, Self::environment())
    }

    /// Like [`load`](Self::load) with an explicit config directory and
    /// variable source. Both files are optional.
    pub fn load_from(
        dir: &Path,
        env: &str,
        environment: config::Environment,
    ) -> Result<Self, AppError> {
        let layer = |name: &str| {
            config::File::with_name(&dir.join(name).to_string_lossy()).required(false)
        };
        let config = config::Config::builder()
            .add_source(layer("default"))
            .add_source(layer(env))
            .add_source(environment)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// The `WARDEN__SECTION__KEY` variable source.
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix("WARDEN")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    /// Check values that cannot be expressed through serde defaults.
    pub fn validate(&self) -> Result<(), AppError> {
        self.token.validate()
    }
}
