//! Unified error handling for mudexport
//!
//! Every failure in the toolkit is fail-fast: errors are surfaced to the
//! caller and never auto-corrected.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all mudexport operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // ==================== Export Errors ====================

    /// A vertex carries no bone-weight groups
    #[error("Missing skin data: vertex {vertex} has no bone weight groups")]
    MissingSkinData {
        vertex: u32,
    },

    /// Caller broke a construction contract
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        message: String,
    },

    // ==================== Input Errors ====================

    /// Invalid data structure in an input document
    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
    },

    /// Unsupported input format
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        format: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Strip any context wrappers and return the underlying error
    pub fn root(&self) -> &Self {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::FileNotFound(_))
    }

    /// Check if this error was caused by bad input rather than I/O
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.root(),
            Self::MissingSkinData { .. }
                | Self::InvalidArgument { .. }
                | Self::InvalidData { .. }
                | Self::UnsupportedFormat { .. }
        )
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
