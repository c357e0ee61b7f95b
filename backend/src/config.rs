//! Configuration management for the Invoice Management System
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with IMS_ prefix

use config::{ConfigError, Environment, File};
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

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Invoice numbering
    pub invoice: InvoiceConfig,

    /// PDF export
    #[serde(default)]
    pub pdf: PdfConfig,

    /// Initial superadmin account
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
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
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InvoiceConfig {
    /// Prefix of generated invoice numbers
    pub number_prefix: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PdfConfig {
    /// Directory where a copy of every generated PDF is written
    pub archive_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BootstrapConfig {
    pub superadmin_username: Option<String>,
    pub superadmin_password: Option<String>,
    pub superadmin_email: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("IMS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::builder(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (IMS_ prefix)
            .add_source(
                Environment::with_prefix("IMS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Builder preloaded with the default values
    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 604800)?
            .set_default("invoice.number_prefix", shared::DEFAULT_INVOICE_PREFIX)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_unset_sections() {
        let config: Config = Config::builder("test")
            .unwrap()
            .set_override("database.url", "postgres://localhost/ims_test")
            .unwrap()
            .set_override("jwt.secret", "secret")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.environment, "test");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.access_token_expiry, 3600);
        assert_eq!(config.invoice.number_prefix, "INV");
        assert!(config.pdf.archive_dir.is_none());
        assert!(config.bootstrap.superadmin_username.is_none());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert!(!config.is_development());
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let result = Config::builder("test")
            .unwrap()
            .set_override("database.url", "postgres://localhost/ims_test")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<Config>();

        assert!(result.is_err());
    }
}
