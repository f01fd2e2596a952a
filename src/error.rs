//! Error types for the cartoonspoon library.

use thiserror::Error;

/// Errors that can occur while discovering, planning or downloading media.
#[derive(Error, Debug)]
pub enum Error {
    /// Google Drive API returned a non-success status.
    #[error("Drive API error ({status}): {message}")]
    Drive {
        /// HTTP status code returned by the API.
        status: u16,
        /// Response body or a short description.
        message: String,
    },

    /// Metadata catalog returned a non-success status.
    #[error("Metadata lookup failed: {0}")]
    Metadata(String),

    /// Link discovery on the content site failed.
    #[error("Search failed: {0}")]
    Search(String),

    /// Configuration could not be loaded or is incomplete.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON payload could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The run was cancelled between two downloads.
    #[error("Download cancelled")]
    Cancelled,
}

/// A specialized `Result` type for cartoonspoon operations.
pub type Result<T> = std::result::Result<T, Error>;
