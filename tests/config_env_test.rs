//! Config environment variable tests
//!
//! These tests verify that Config::from_env() reads and applies environment
//! variable overrides. Config::from_env() also loads a .env file via
//! dotenvy if one exists, so each test sets the variables it checks.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use case_intelligence::config::{Config, LogFormat};
use case_intelligence::AppError;
use serial_test::serial;
use std::env;

const VARS: [&str; 9] = [
    "ANALYSIS_BASE_URL",
    "ANALYSIS_API_KEY",
    "ENDPOINT_ANALYZE",
    "DATABASE_PATH",
    "DATABASE_MAX_CONNECTIONS",
    "LOG_FORMAT",
    "REQUEST_TIMEOUT_MS",
    "PROGRESS_RESET_MS",
    "NOTES_AUTOSAVE_MS",
];

fn clear_vars() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults() {
    clear_vars();

    let config = Config::from_env().unwrap();
    assert_eq!(config.service.base_url, "http://localhost:8000");
    assert!(config.service.api_key.is_none());
    assert_eq!(config.endpoints.analyze, "/api/analyze-case");
    assert_eq!(config.endpoints.health, "/health");
    assert_eq!(config.request.timeout_ms, 30000);
    assert_eq!(config.dashboard.progress_reset_ms, 1000);
    assert_eq!(config.dashboard.notes_autosave_ms, 2000);
    assert_eq!(config.database.path.to_str().unwrap(), "./data/cases.db");
}

#[test]
#[serial]
fn test_overrides() {
    clear_vars();
    env::set_var("ANALYSIS_BASE_URL", "https://analysis.example.com");
    env::set_var("ANALYSIS_API_KEY", "token-123");
    env::set_var("ENDPOINT_ANALYZE", "/v2/analyze");
    env::set_var("DATABASE_PATH", "/custom/path.db");
    env::set_var("DATABASE_MAX_CONNECTIONS", "10");
    env::set_var("LOG_FORMAT", "json");
    env::set_var("REQUEST_TIMEOUT_MS", "12000");
    env::set_var("NOTES_AUTOSAVE_MS", "500");

    let config = Config::from_env().unwrap();
    assert_eq!(config.service.base_url, "https://analysis.example.com");
    assert_eq!(config.service.api_key.as_deref(), Some("token-123"));
    assert_eq!(config.endpoints.analyze, "/v2/analyze");
    assert_eq!(config.endpoints.risk, "/api/calculate-risk");
    assert_eq!(config.database.path.to_str().unwrap(), "/custom/path.db");
    assert_eq!(config.database.max_connections, 10);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.request.timeout_ms, 12000);
    assert_eq!(config.dashboard.notes_autosave_ms, 500);

    clear_vars();
}

#[test]
#[serial]
fn test_unparseable_numbers_fall_back_to_defaults() {
    clear_vars();
    env::set_var("REQUEST_TIMEOUT_MS", "soon");
    env::set_var("PROGRESS_RESET_MS", "-5");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 30000);
    assert_eq!(config.dashboard.progress_reset_ms, 1000);

    clear_vars();
}

#[test]
#[serial]
fn test_blank_api_key_is_ignored() {
    clear_vars();
    env::set_var("ANALYSIS_API_KEY", "   ");

    let config = Config::from_env().unwrap();
    assert!(config.service.api_key.is_none());

    clear_vars();
}

#[test]
#[serial]
fn test_invalid_base_url_is_rejected() {
    clear_vars();
    env::set_var("ANALYSIS_BASE_URL", "localhost:8000");

    let result = Config::from_env();
    assert!(matches!(result, Err(AppError::Config { .. })));

    clear_vars();
}
