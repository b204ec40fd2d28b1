//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session file could not be read or written
    #[error("Session error: {0}")]
    Store(#[from] docagram_store::StoreError),

    /// Analysis aborted
    #[error("{}", .0.report())]
    Analysis(#[from] docagram_extractor::AnalysisError),

    /// Model backend error outside an analysis run
    #[error("Model error: {0}")]
    Model(#[from] docagram_llm::ModelError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
