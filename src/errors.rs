use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the health checker
#[derive(Debug, Error)]
pub enum HealthError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Report parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// No parser registered under the requested name
    #[error("No parser named '{0}'")]
    ParserNotFound(String),

    /// Input path does not exist
    #[error("The path '{0}' is not a valid file or directory")]
    InvalidPath(PathBuf),

    /// Export errors
    #[error("Export failed: {0}")]
    Export(String),

    /// JSON output errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors a parser can raise while extracting a report
#[derive(Debug, Error)]
pub enum ParseError {
    /// Content is not in the shape the parser expects
    #[error("{parser}: malformed report: {message}")]
    Malformed { parser: String, message: String },

    /// The parser panicked while handling the report
    #[error("{parser}: parser panicked: {message}")]
    Panicked { parser: String, message: String },
}

/// Configuration related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Failed to load config from {path}: {message}")]
    LoadError { path: PathBuf, message: String },

    /// Error parsing configuration
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid glob pattern in the configuration
    #[error("Invalid include pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
