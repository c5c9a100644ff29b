//! Error types for the CLI.

use std::path::PathBuf;

use thiserror::Error;

/// CLI-specific result type.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
pub enum CliError {
    /// No dataset specified.
    #[error("no dataset specified. Use --data or set RADJOIN_DATA environment variable")]
    NoDatasetSpecified,

    /// Dataset file not found.
    #[error("dataset not found: {0}")]
    DatasetNotFound(PathBuf),

    /// Join engine error.
    #[error("join error: {0}")]
    Join(#[from] radjoin::JoinError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad log filter directive.
    #[error("log filter error: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// Invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
