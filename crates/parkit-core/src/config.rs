//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub fare: FareConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Apply embedded migrations on startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_run_migrations() -> bool {
    true
}

/// Fare configuration
///
/// Amounts are expressed in cents, the whole currency unit prices are
/// rounded to.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FareConfig {
    /// Hourly rate for cars, never negative
    #[serde(default = "default_car_rate")]
    pub car_rate_per_hour: u32,

    /// Hourly rate for bikes, never negative
    #[serde(default = "default_bike_rate")]
    pub bike_rate_per_hour: u32,

    /// Stays up to this many minutes are free
    #[serde(default = "default_free_minutes")]
    pub free_minutes: i64,

    /// Discount granted to recurring vehicles
    #[serde(default = "default_discount_percent")]
    pub recurring_discount_percent: u32,
}

fn default_car_rate() -> u32 {
    150
}

fn default_bike_rate() -> u32 {
    100
}

fn default_free_minutes() -> i64 {
    30
}

fn default_discount_percent() -> u32 {
    5
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            car_rate_per_hour: default_car_rate(),
            bike_rate_per_hour: default_bike_rate(),
            free_minutes: default_free_minutes(),
            recurring_discount_percent: default_discount_percent(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default level for the parkit crates when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which store implementation backs the services
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

/// Storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Car spots seeded by the in-memory backend
    #[serde(default = "default_car_spots")]
    pub car_spots: i32,

    /// Bike spots seeded by the in-memory backend
    #[serde(default = "default_bike_spots")]
    pub bike_spots: i32,
}

fn default_car_spots() -> i32 {
    3
}

fn default_bike_spots() -> i32 {
    2
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            car_spots: default_car_spots(),
            bike_spots: default_bike_spots(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Self::builder_with_defaults()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with PARKIT_ prefix
            .add_source(
                Environment::with_prefix("PARKIT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    fn builder_with_defaults(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.url", "postgresql://localhost/parkit")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("fare.car_rate_per_hour", 150)?
            .set_default("fare.bike_rate_per_hour", 100)?
            .set_default("fare.free_minutes", 30)?
            .set_default("fare.recurring_discount_percent", 5)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("storage.backend", "postgres")?
            .set_default("storage.car_spots", 3)?
            .set_default("storage.bike_spots", 2)
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
