//! Unified error types for gpuexpose
//!
//! Selector parsing and planning never fail (they degrade to "no GPUs"),
//! so errors only come from the host scan, the executor and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error while taking the host inventory snapshot
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Error while applying an exposure plan
    #[error("Exposure error: {0}")]
    Exposure(#[from] ExposureError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error (output, file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from scanning the host device/library inventory
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Host device directory could not be read
    #[error("Cannot read device directory {path}: {source}")]
    DeviceDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from applying a plan to the container namespace
#[derive(Error, Debug)]
pub enum ExposureError {
    /// A device node could not be bound into the container
    #[error("Failed to bind device {host} to {target}: {source}")]
    DeviceBind {
        host: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The driver library directory could not be exposed
    #[error("Failed to expose driver libraries at {target}: {source}")]
    LibraryMount {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Container root does not exist or is not a directory
    #[error("Container root is not a directory: {0}")]
    InvalidRootfs(PathBuf),

    /// A target inside the container root is, or passes through, a symlink
    #[error("Refusing to follow symlink in container root: {0}")]
    SymlinkInRootfs(PathBuf),
}

impl ExposureError {
    /// Underlying IO error, if the failure came from the backend
    pub fn io_source(&self) -> Option<&std::io::Error> {
        match self {
            ExposureError::DeviceBind { source, .. } => Some(source),
            ExposureError::LibraryMount { source, .. } => Some(source),
            ExposureError::InvalidRootfs(_) | ExposureError::SymlinkInRootfs(_) => None,
        }
    }
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
