use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub analytics: AnalyticsConfig,
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

        let analytics = AnalyticsConfig::from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            analytics,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Tunables for the funnel aggregation pipeline.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Neighborhoods with fewer inquiries than this are dropped from the
    /// conversion breakdown to avoid noisy small-sample estimates.
    pub min_neighborhood_inquiries: usize,
    /// Average host response time above this many hours triggers a
    /// responsiveness recommendation.
    pub slow_response_hours: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            min_neighborhood_inquiries: 50,
            slow_response_hours: 12.0,
        }
    }
}

impl AnalyticsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let min_neighborhood_inquiries = match env::var("APP_MIN_NEIGHBORHOOD_INQUIRIES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidMinInquiries)?,
            Err(_) => defaults.min_neighborhood_inquiries,
        };

        let slow_response_hours = match env::var("APP_SLOW_RESPONSE_HOURS") {
            Ok(raw) => {
                let hours = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidSlowResponseHours)?;
                if !hours.is_finite() || hours < 0.0 {
                    return Err(ConfigError::InvalidSlowResponseHours);
                }
                hours
            }
            Err(_) => defaults.slow_response_hours,
        };

        Ok(Self {
            min_neighborhood_inquiries,
            slow_response_hours,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMinInquiries,
    InvalidSlowResponseHours,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMinInquiries => {
                write!(f, "APP_MIN_NEIGHBORHOOD_INQUIRIES must be a non-negative integer")
            }
            ConfigError::InvalidSlowResponseHours => {
                write!(f, "APP_SLOW_RESPONSE_HOURS must be a non-negative number of hours")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
