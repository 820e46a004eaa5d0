//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every section has defaults, so an empty file yields a working
//! single-node setup (in-memory store, capacity 100).

pub mod app;
pub mod database;
pub mod issuance;
pub mod logging;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::database::DatabaseConfig;
pub use self::issuance::IssuanceConfig;
pub use self::logging::LoggingConfig;
pub use self::store::{RedisStoreConfig, StoreConfig};

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "COUPON";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Coordination store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Coupon issuance settings.
    #[serde(default)]
    pub issuance: IssuanceConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for a named environment.
    ///
    /// Merges `config/default`, the `config/{env}` overlay, and environment
    /// variables prefixed with `COUPON__` (e.g. `COUPON__ISSUANCE__CAPACITY`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        Self::finish(builder)
    }

    /// Load configuration from an explicit file path plus environment overrides.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));
        Self::finish(builder)
    }

    /// Parse configuration from an in-memory TOML document (no environment overrides).
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AppError> {
        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject settings the engine cannot operate with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.issuance.capacity == 0 {
            return Err(AppError::configuration(
                "issuance.capacity must be greater than zero",
            ));
        }
        if self.issuance.campaign.trim().is_empty() {
            return Err(AppError::configuration(
                "issuance.campaign must not be empty",
            ));
        }
        if self.store.operation_timeout_ms == 0 {
            return Err(AppError::configuration(
                "store.operation_timeout_ms must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.issuance.capacity, 100);
        assert_eq!(config.store.provider, "memory");
        assert!(!config.issuance.release_claim_on_exhausted);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AppConfig::from_toml(
            r#"
            [issuance]
            campaign = "spring-sale"
            capacity = 5
            release_claim_on_exhausted = true

            [store]
            provider = "redis"
            operation_timeout_ms = 200

            [store.redis]
            url = "redis://cache:6379"
            "#,
        )
        .unwrap();

        assert_eq!(config.issuance.campaign, "spring-sale");
        assert_eq!(config.issuance.capacity, 5);
        assert!(config.issuance.release_claim_on_exhausted);
        assert_eq!(config.store.provider, "redis");
        assert_eq!(config.store.redis.url, "redis://cache:6379");
        assert_eq!(config.store.redis.key_prefix, "couponhub:");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = AppConfig::from_toml("[issuance]\ncapacity = 0\n").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.store.operation_timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
