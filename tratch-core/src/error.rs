//! Typed error handling for tratch.
//!
//! Library consumers can match on these variants; everything the discovery
//! engine itself encounters (unresolved symbols, missing declarations,
//! malformed documentation) is recovered at node or method granularity and
//! never surfaces here as a fatal error.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tratch operations.
#[derive(Error, Debug)]
pub enum TratchError {
    /// I/O error when reading a model or config file
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Project model could not be deserialized or is internally inconsistent
    #[error("Model error at {path}: {message}")]
    Model { path: PathBuf, message: String },

    /// Documentation XML could not be parsed even after sanitizing
    #[error("Documentation error: {message}")]
    Doc { message: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TratchError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a model error.
    pub fn model(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Model {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a documentation error.
    pub fn doc(message: impl Into<String>) -> Self {
        Self::Doc {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error leaves the rest of the run usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Doc { .. } | Self::Config { .. })
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Model { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for tratch results.
pub type TratchResult<T> = Result<T, TratchError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> TratchResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> TratchResult<T> {
        self.map_err(|e| TratchError::io(path, e))
    }
}
