//! Error types for kustomize-validator.
//!
//! Build failures and content violations are reported as values on the
//! result stream; only conditions that stop the whole run end up here.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a validation run.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The directory to validate does not exist or is not a directory
    #[error("Cannot access root path {}: {reason}", path.display())]
    RootInaccessible {
        /// Path given on the command line
        path: PathBuf,
        /// Why it could not be used
        reason: String,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unexpected fields
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Result type alias for validator operations
pub type Result<T> = std::result::Result<T, ValidatorError>;
