//! Error types for readycheck operations.
//!
//! This module defines [`ReadyCheckError`], the primary error type used
//! throughout the harness, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Transport failures and unexpected statuses are *not* errors: the probe
//!   executor turns them into values and checks record them as FAIL.
//! - Check bodies return `anyhow::Result`; the coordinator converts any error
//!   into a FAIL result at the check boundary.
//! - `ReadyCheckError` is reserved for things that stop a command: bad
//!   configuration, a dependent process that never came up, report I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for readycheck operations.
#[derive(Debug, Error)]
pub enum ReadyCheckError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {message}")]
    HttpClient { message: String },

    /// The dependent process failed to spawn, become ready, or stay alive.
    #[error("Dependent process '{command}' failed: {reason}")]
    ProcessLifecycle { command: String, reason: String },

    /// An external command could not be launched.
    #[error("Failed to run '{command}': {message}")]
    CommandFailed { command: String, message: String },

    /// A report could not be written or read back.
    #[error("Report error at {path}: {message}")]
    ReportError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReadyCheckError {
    /// Process exit code for a command that stopped with this error.
    ///
    /// Configuration and dependent-process failures map to 2, everything
    /// else to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReadyCheckError::ConfigNotFound { .. }
            | ReadyCheckError::ConfigParseError { .. }
            | ReadyCheckError::ConfigValidationError { .. }
            | ReadyCheckError::ProcessLifecycle { .. } => 2,
            _ => 1,
        }
    }
}

/// Result type alias for readycheck operations.
pub type Result<T> = std::result::Result<T, ReadyCheckError>;
