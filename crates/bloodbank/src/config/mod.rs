use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::domain::StockThresholds;
use crate::eligibility::EligibilityPolicy;
use crate::inventory::LedgerConfig;

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
    pub ledger: LedgerConfig,
    pub eligibility: EligibilityPolicy,
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

        let defaults = StockThresholds::default();
        let thresholds = StockThresholds {
            critical_below: numeric("APP_LOW_STOCK_THRESHOLD", defaults.critical_below)?,
            low_below: numeric("APP_STOCK_WARNING_THRESHOLD", defaults.low_below)?,
        };
        if thresholds.low_below < thresholds.critical_below {
            return Err(ConfigError::InvalidThresholds {
                critical_below: thresholds.critical_below,
                low_below: thresholds.low_below,
            });
        }

        let ledger = LedgerConfig {
            max_conflict_retries: numeric(
                "APP_LEDGER_CONFLICT_RETRIES",
                LedgerConfig::default().max_conflict_retries,
            )?,
            thresholds,
        };

        let policy = EligibilityPolicy::default();
        let eligibility = EligibilityPolicy {
            minimum_age: numeric("APP_DONOR_MIN_AGE", policy.minimum_age)?,
            maximum_age: numeric("APP_DONOR_MAX_AGE", policy.maximum_age)?,
            minimum_weight_kg: numeric("APP_DONOR_MIN_WEIGHT_KG", policy.minimum_weight_kg)?,
            donation_interval_days: numeric(
                "APP_DONATION_INTERVAL_DAYS",
                policy.donation_interval_days,
            )?,
        };
        validate_policy(&eligibility)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            ledger,
            eligibility,
        })
    }
}

fn numeric<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn validate_policy(policy: &EligibilityPolicy) -> Result<(), ConfigError> {
    let reason = if policy.minimum_age < 0 || policy.minimum_age > policy.maximum_age {
        "APP_DONOR_MIN_AGE must be between 0 and APP_DONOR_MAX_AGE"
    } else if !policy.minimum_weight_kg.is_finite() || policy.minimum_weight_kg < 0.0 {
        "APP_DONOR_MIN_WEIGHT_KG must be a finite, non-negative weight"
    } else if policy.donation_interval_days < 0 {
        "APP_DONATION_INTERVAL_DAYS must not be negative"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidPolicy { reason })
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

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidThresholds { critical_below: u32, low_below: u32 },
    InvalidPolicy { reason: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be numeric (found '{value}')")
            }
            ConfigError::InvalidThresholds {
                critical_below,
                low_below,
            } => write!(
                f,
                "APP_STOCK_WARNING_THRESHOLD ({low_below}) must not be below APP_LOW_STOCK_THRESHOLD ({critical_below})"
            ),
            ConfigError::InvalidPolicy { reason } => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidThresholds { .. }
            | ConfigError::InvalidPolicy { .. } => None,
        }
    }
}
