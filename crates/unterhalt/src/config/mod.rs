use crate::support::{SupportTable, TableConstants, TableError};
use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub table: TableConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            table: TableConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Which table edition to load and the statutory constants that accompany it.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub year: u16,
    pub csv_path: Option<PathBuf>,
    pub constants: TableConstants,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            year: 2023,
            csv_path: None,
            constants: TableConstants::duesseldorf_2023(),
        }
    }
}

impl TableConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let year = match env::var("UNTERHALT_TABLE_YEAR") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidTableYear)?,
            Err(_) => defaults.year,
        };

        let csv_path = env::var("UNTERHALT_TABLE_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let constants = TableConstants {
            protected_minimum_income: decimal_var(
                "UNTERHALT_PROTECTED_MINIMUM",
                defaults.constants.protected_minimum_income,
            )?,
            protected_minimum_housing_share: decimal_var(
                "UNTERHALT_HOUSING_SHARE",
                defaults.constants.protected_minimum_housing_share,
            )?,
        };

        Ok(Self {
            year,
            csv_path,
            constants,
        })
    }

    /// Loads and validates the configured edition, falling back to the embedded one.
    pub fn load_table(&self) -> Result<SupportTable, TableError> {
        match &self.csv_path {
            Some(path) => SupportTable::from_path(self.year, path, self.constants),
            None => SupportTable::embedded(self.year, self.constants),
        }
    }
}

fn decimal_var(name: &'static str, default: Decimal) -> Result<Decimal, ConfigError> {
    match env::var(name) {
        Ok(raw) => Decimal::from_str(raw.trim()).map_err(|_| ConfigError::InvalidAmount(name)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTableYear,
    InvalidAmount(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTableYear => {
                write!(f, "UNTERHALT_TABLE_YEAR must be a valid year")
            }
            ConfigError::InvalidAmount(name) => write!(f, "{name} must be a decimal amount"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTableYear
            | ConfigError::InvalidAmount(_) => None,
        }
    }
}
