//! Error types for launchboard.
//!
//! This module defines all error types used throughout the launchboard crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for launchboard operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Fetch Errors ===
    /// The request could not be sent or the response body could not be read.
    #[error("request to {url} failed: {source}")]
    Network {
        /// The requested URL.
        url: String,
        /// The underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("request to {url} returned status {status}")]
    HttpStatus {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not the expected JSON.
    #[error("malformed response from {url}: {source}")]
    Parse {
        /// The requested URL.
        url: String,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The request was superseded by a newer one and aborted.
    #[error("request cancelled")]
    Cancelled,

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Export Errors ===
    /// Export was requested with nothing selected.
    #[error("no launches selected for export")]
    EmptySelection,

    /// The PDF document could not be produced.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// An image could not be decoded or re-encoded.
    #[error("image error: {0}")]
    Image(String),

    /// A chart payload did not carry valid base64 data.
    #[error("invalid chart payload: {0}")]
    ChartDecode(#[from] base64::DecodeError),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for launchboard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new PDF error.
    #[must_use]
    pub fn pdf(message: impl Into<String>) -> Self {
        Self::Pdf(message.into())
    }

    /// Create a new image error.
    #[must_use]
    pub fn image(message: impl Into<String>) -> Self {
        Self::Image(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error came from a remote fetch (transport, status or body).
    ///
    /// Callers treat all of these the same way: log, stop loading, keep
    /// whatever state they already had.
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::HttpStatus { .. } | Self::Parse { .. }
        )
    }

    /// Check if this error indicates a superseded request.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
