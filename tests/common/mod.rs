//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use case_intelligence::api::AnalysisClient;
use case_intelligence::config::{
    Config, DashboardConfig, DatabaseConfig, EndpointConfig, LogFormat, LoggingConfig,
    RequestConfig, ServiceConfig,
};
use case_intelligence::storage::{KeyValueStore, MemoryStore};
use case_intelligence::CaseSession;

/// Configuration pointing at a mock analysis service.
pub fn test_config(base_url: &str) -> Config {
    Config {
        service: ServiceConfig {
            base_url: base_url.to_string(),
            api_key: None,
        },
        database: DatabaseConfig {
            path: PathBuf::from("./data/test.db"),
            max_connections: 1,
        },
        logging: LoggingConfig {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        },
        request: RequestConfig { timeout_ms: 5000 },
        endpoints: EndpointConfig::default(),
        dashboard: DashboardConfig {
            progress_reset_ms: 50,
            notes_autosave_ms: 100,
        },
    }
}

/// HTTP client for a mock analysis service
pub fn test_client(config: &Config) -> AnalysisClient {
    AnalysisClient::new(
        &config.service,
        config.endpoints.clone(),
        config.request.clone(),
    )
    .expect("Failed to create client")
}

/// Session over the given store, talking to `base_url`.
pub fn test_session_with_store(base_url: &str, store: Arc<dyn KeyValueStore>) -> CaseSession {
    let config = test_config(base_url);
    let client = test_client(&config);
    CaseSession::new(config, Arc::new(client), store)
}

/// Session over an in-memory store, talking to `base_url`.
pub fn test_session(base_url: &str) -> CaseSession {
    test_session_with_store(base_url, Arc::new(MemoryStore::new()))
}
