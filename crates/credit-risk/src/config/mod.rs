use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::assessment::{EngineConfig, EngineConfigError};

const DEFAULT_BUREAU_TIMEOUT_MS: u64 = 3_000;

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
    pub bureau: BureauConfig,
    /// Optional JSON file overriding the default engine weights and thresholds.
    pub engine_config_path: Option<PathBuf>,
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

        let engine_config_path = env::var("RISK_ENGINE_CONFIG")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let bureau = BureauConfig::from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            bureau,
            engine_config_path,
        })
    }

    /// Resolve the engine configuration, reading the JSON override when one is configured.
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let config = match &self.engine_config_path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::EngineFile {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str::<EngineConfig>(&raw).map_err(|source| {
                    ConfigError::EngineParse {
                        path: path.clone(),
                        source,
                    }
                })?
            }
            None => EngineConfig::default(),
        };

        config.validate().map_err(ConfigError::Engine)?;
        Ok(config)
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

/// Which bureau collaborator the process should wire in at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BureauMode {
    Mock,
    Http,
}

impl BureauMode {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "mock" => Ok(Self::Mock),
            "http" | "live" => Ok(Self::Http),
            other => Err(ConfigError::UnknownBureauMode(other.to_string())),
        }
    }
}

/// Connection settings for the external credit bureau.
#[derive(Debug, Clone)]
pub struct BureauConfig {
    pub mode: BureauMode,
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    pub timeout_ms: u64,
}

impl Default for BureauConfig {
    fn default() -> Self {
        Self {
            mode: BureauMode::Mock,
            base_url: None,
            api_token: None,
            timeout_ms: DEFAULT_BUREAU_TIMEOUT_MS,
        }
    }
}

impl BureauConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mode = BureauMode::parse(&env::var("BUREAU_MODE").unwrap_or_default())?;
        let base_url = env::var("BUREAU_BASE_URL")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty());
        let api_token = env::var("BUREAU_API_TOKEN")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let timeout_ms = match env::var("BUREAU_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidBureauTimeout)?,
            Err(_) => DEFAULT_BUREAU_TIMEOUT_MS,
        };

        if mode == BureauMode::Http && base_url.is_none() {
            return Err(ConfigError::MissingBureauUrl);
        }

        Ok(Self {
            mode,
            base_url,
            api_token,
            timeout_ms,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    UnknownBureauMode(String),
    MissingBureauUrl,
    InvalidBureauTimeout,
    EngineFile {
        path: PathBuf,
        source: std::io::Error,
    },
    EngineParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Engine(EngineConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownBureauMode(mode) => {
                write!(f, "BUREAU_MODE must be 'mock' or 'http' (found '{mode}')")
            }
            ConfigError::MissingBureauUrl => {
                write!(f, "BUREAU_BASE_URL is required when BUREAU_MODE=http")
            }
            ConfigError::InvalidBureauTimeout => {
                write!(f, "BUREAU_TIMEOUT_MS must be a positive integer")
            }
            ConfigError::EngineFile { path, .. } => {
                write!(f, "unable to read engine config '{}'", path.display())
            }
            ConfigError::EngineParse { path, source } => {
                write!(f, "engine config '{}' is malformed: {}", path.display(), source)
            }
            ConfigError::Engine(err) => write!(f, "engine config rejected: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::UnknownBureauMode(_)
            | ConfigError::MissingBureauUrl
            | ConfigError::InvalidBureauTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::EngineFile { source, .. } => Some(source),
            ConfigError::EngineParse { source, .. } => Some(source),
            ConfigError::Engine(err) => Some(err),
        }
    }
}
