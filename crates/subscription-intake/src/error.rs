use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::financing::{ApplicationServiceError, RepositoryError, RosterImportError};

/// Failures that end a CLI command or stop the service from starting. Request-level errors are
/// mapped to HTTP responses by each workflow router instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("roster error: {0}")]
    Roster(#[from] RosterImportError),
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
    #[error("startup error: {0}")]
    Startup(#[from] ApplicationServiceError),
    #[error("could not encode report: {0}")]
    Encode(#[from] serde_json::Error),
}
