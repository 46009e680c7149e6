use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub endpoints: EndpointConfig,
    pub dashboard: DashboardConfig,
}

/// Remote analysis service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Bearer token, sent only when set.
    pub api_key: Option<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration.
///
/// Each pipeline stage gets exactly one attempt bounded by `timeout_ms`.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

/// Endpoint paths on the analysis service, relative to the base URL
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    pub analyze: String,
    pub risk: String,
    pub strength: String,
    pub precedents: String,
    pub timeline: String,
    pub evidence: String,
    pub health: String,
}

/// Timing of dashboard side effects
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Delay before the progress indicator returns to neutral after a run.
    pub progress_reset_ms: u64,
    /// Quiet period before a note edit is persisted.
    pub notes_autosave_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url =
            env::var("ANALYSIS_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::Config {
                message: format!("ANALYSIS_BASE_URL must be an http(s) URL, got '{}'", base_url),
            });
        }

        let service = ServiceConfig {
            base_url,
            api_key: env::var("ANALYSIS_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
        };

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/cases.db".to_string()),
            ),
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: parse_env("REQUEST_TIMEOUT_MS", 30000),
        };

        let defaults = EndpointConfig::default();
        let endpoints = EndpointConfig {
            analyze: env::var("ENDPOINT_ANALYZE").unwrap_or(defaults.analyze),
            risk: env::var("ENDPOINT_RISK").unwrap_or(defaults.risk),
            strength: env::var("ENDPOINT_STRENGTH").unwrap_or(defaults.strength),
            precedents: env::var("ENDPOINT_PRECEDENTS").unwrap_or(defaults.precedents),
            timeline: env::var("ENDPOINT_TIMELINE").unwrap_or(defaults.timeline),
            evidence: env::var("ENDPOINT_EVIDENCE").unwrap_or(defaults.evidence),
            health: env::var("ENDPOINT_HEALTH").unwrap_or(defaults.health),
        };

        let dashboard = DashboardConfig {
            progress_reset_ms: parse_env("PROGRESS_RESET_MS", 1000),
            notes_autosave_ms: parse_env("NOTES_AUTOSAVE_MS", 2000),
        };

        Ok(Config {
            service,
            database,
            logging,
            request,
            endpoints,
            dashboard,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl RequestConfig {
    /// Per-stage timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: 30000 }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            analyze: "/api/analyze-case".to_string(),
            risk: "/api/calculate-risk".to_string(),
            strength: "/api/case-strength".to_string(),
            precedents: "/api/find-precedents".to_string(),
            timeline: "/api/generate-timeline".to_string(),
            evidence: "/api/upload-evidence".to_string(),
            health: "/health".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn progress_reset_delay(&self) -> Duration {
        Duration::from_millis(self.progress_reset_ms)
    }

    pub fn notes_autosave_window(&self) -> Duration {
        Duration::from_millis(self.notes_autosave_ms)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            progress_reset_ms: 1000,
            notes_autosave_ms: 2000,
        }
    }
}
