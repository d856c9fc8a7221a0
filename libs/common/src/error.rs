//! Custom error types for the common library
//!
//! This module defines the storage and configuration errors shared by the
//! other crates of the workspace.

use thiserror::Error;

/// Custom error type for durable storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error occurred while reading or writing the backing file
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file could not be encoded or decoded
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key contains characters that cannot be used as a file name
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised while assembling the client configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One of the configuration sources could not be read or parsed
    #[error("Configuration error: {0}")]
    Source(#[from] config::ConfigError),

    /// A value was present but unusable
    #[error("Invalid configuration value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
