//! Error types for quakefind.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur in quakefind operations.
#[derive(Error, Debug)]
pub enum QuakeFindError {
    /// Command-line options were combined incorrectly
    #[error("{0}")]
    Usage(String),

    /// User input failed validation before any network call
    #[error("invalid input: {0}")]
    Validation(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// API returned an error status
    #[error("ComCat API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid response structure
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// CSV export failed
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// Excel export failed
    #[error("Excel export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
