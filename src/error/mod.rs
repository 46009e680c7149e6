use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Analysis service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("View error: {0}")]
    View(#[from] ViewError),
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("Stored value for '{key}' is not valid: {message}")]
    Serialization { key: String, message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Transport-level failures talking to the analysis service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Analysis service unavailable: {message}")]
    Unavailable { message: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Evidence upload rejected for {filename}")]
    UploadRejected { filename: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A pipeline run aborted by a transport failure at one stage
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: crate::pipeline::Stage,
    #[source]
    pub source: ServiceError,
}

/// Errors from the derived view builders
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Unknown deadline type: {value}")]
    UnknownDeadline { value: String },

    #[error("The {view} view has nothing to show yet")]
    Unavailable { view: String },
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for analysis service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Stage;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing key");
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Connection {
            message: "failed to connect".to_string(),
        };
        assert_eq!(err.to_string(), "Database connection failed: failed to connect");

        let err = StorageError::Serialization {
            key: "case_history".to_string(),
            message: "expected array".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Stored value for 'case_history' is not valid: expected array"
        );

        let err = StorageError::Migration {
            message: "version mismatch".to_string(),
        };
        assert_eq!(err.to_string(), "Migration failed: version mismatch");
    }

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 502 - bad gateway");

        let err = ServiceError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Request timeout after 5000ms");

        let err = ServiceError::UploadRejected {
            filename: "fir.pdf".to_string(),
        };
        assert_eq!(err.to_string(), "Evidence upload rejected for fir.pdf");
    }

    #[test]
    fn test_pipeline_error_names_stage() {
        let err = PipelineError {
            stage: Stage::Risk,
            source: ServiceError::Timeout { timeout_ms: 10 },
        };
        assert_eq!(err.to_string(), "risk stage failed: Request timeout after 10ms");
    }

    #[test]
    fn test_view_error_display() {
        let err = ViewError::InvalidDate {
            value: "01/01/2024".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid date '01/01/2024': expected YYYY-MM-DD");
    }

    #[test]
    fn test_storage_error_conversion_to_app_error() {
        let storage_err = StorageError::Query {
            message: "disk full".to_string(),
        };
        let app_err: AppError = storage_err.into();
        assert!(matches!(app_err, AppError::Storage(_)));
    }

    #[test]
    fn test_service_error_conversion_to_app_error() {
        let err = ServiceError::Timeout { timeout_ms: 1000 };
        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::Service(_)));
    }
}
