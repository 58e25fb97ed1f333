//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from a
//! default TOML file, an optional environment overlay, and `INBOXHUB__*`
//! environment variables. Every section has serde defaults, so an empty
//! configuration is valid.

pub mod logging;
pub mod realtime;
pub mod remote;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::remote::RemoteConfig;
pub use self::store::StoreConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "INBOXHUB";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote notification service settings.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Push channel and connection polling settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Notification store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml` and environment
    /// variables prefixed with `INBOXHUB`. Missing files are skipped.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(env_source())
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load configuration from an explicit file path plus environment overrides.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(env_source())
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
