use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::roommates::router::MatchLimits;
use crate::roommates::scoring::{ScoringConfig, WeightTableError};

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
    pub matching: MatchingConfig,
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
            matching: MatchingConfig::from_env()?,
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

/// Ranking defaults and the optional external weight table.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    pub min_score: u8,
    pub page_size: usize,
    pub max_page_size: usize,
    pub weights_path: Option<PathBuf>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        let limits = MatchLimits::default();
        Self {
            min_score: limits.min_score,
            page_size: limits.page_size,
            max_page_size: limits.max_page_size,
            weights_path: None,
        }
    }
}

impl MatchingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let min_score = match env::var("APP_MATCH_MIN_SCORE") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|score| *score <= 100)
                .ok_or(ConfigError::InvalidMinScore)?,
            Err(_) => defaults.min_score,
        };

        let page_size = parse_page_size("APP_MATCH_PAGE_SIZE", defaults.page_size)?;
        let max_page_size = parse_page_size("APP_MATCH_MAX_PAGE_SIZE", defaults.max_page_size)?;
        if page_size > max_page_size {
            return Err(ConfigError::InvalidPageSize("APP_MATCH_PAGE_SIZE"));
        }

        let weights_path = env::var("APP_MATCH_WEIGHTS")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            min_score,
            page_size,
            max_page_size,
            weights_path,
        })
    }

    pub fn limits(&self) -> MatchLimits {
        MatchLimits {
            min_score: self.min_score,
            page_size: self.page_size,
            max_page_size: self.max_page_size,
        }
    }

    /// The configured weight table, or the built-in one when no path is set.
    pub fn scoring(&self) -> Result<ScoringConfig, ConfigError> {
        match &self.weights_path {
            Some(path) => ScoringConfig::from_path(path).map_err(|source| ConfigError::Weights {
                path: path.clone(),
                source,
            }),
            None => Ok(ScoringConfig::default()),
        }
    }
}

fn parse_page_size(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|size| *size > 0)
            .ok_or(ConfigError::InvalidPageSize(key)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMinScore,
    InvalidPageSize(&'static str),
    Weights {
        path: PathBuf,
        source: WeightTableError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMinScore => {
                write!(f, "APP_MATCH_MIN_SCORE must be an integer between 0 and 100")
            }
            ConfigError::InvalidPageSize(key) => write!(
                f,
                "{key} must be a positive integer no larger than APP_MATCH_MAX_PAGE_SIZE"
            ),
            ConfigError::Weights { path, source } => {
                write!(f, "weight table {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Weights { source, .. } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidMinScore
            | ConfigError::InvalidPageSize(_) => None,
        }
    }
}
