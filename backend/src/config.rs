//! Configuration management for the asset recovery finance service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with ARF_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Which store backs the finance engine
    pub store: StoreConfig,

    /// Settlement numbering and reporting thresholds
    pub finance: FinanceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FinanceConfig {
    /// Prefix of settlement numbers (PREFIX-YYYY-NNNNN)
    pub settlement_prefix: String,

    /// Margin at or above which a settled batch counts as healthy
    pub healthy_margin_pct: Decimal,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("ARF_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("store.backend", "postgres")?
            .set_default("finance.settlement_prefix", "LIQ")?
            .set_default("finance.healthy_margin_pct", "15")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (ARF_ prefix)
            .add_source(
                Environment::with_prefix("ARF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject combinations that would only fail later at runtime
    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        use crate::error::AppError;

        if self.store.backend == StoreBackend::Postgres && self.database.url.trim().is_empty() {
            return Err(AppError::Configuration(
                "database.url is required for the postgres store".to_string(),
            ));
        }
        if self.finance.settlement_prefix.trim().is_empty() {
            return Err(AppError::Configuration(
                "finance.settlement_prefix cannot be empty".to_string(),
            ));
        }
        if self.finance.healthy_margin_pct < Decimal::ZERO {
            return Err(AppError::Configuration(
                "finance.healthy_margin_pct cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Configuration for tests and local runs against the in-memory store
    pub fn in_memory() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
                min_connections: 1,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
            },
            finance: FinanceConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            settlement_prefix: "LIQ".to_string(),
            healthy_margin_pct: Decimal::from(15),
        }
    }
}
