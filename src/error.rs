//! Error types for the order-confirm-pdf library.
//!
//! Two types reflect two layers:
//!
//! * [`SinkError`]: the document stream itself failed (a content stream
//!   could not be encoded, or the serialised bytes could not be written).
//!   Travels inside the stream as [`crate::document::SinkEvent::Error`].
//!
//! * [`OrderPdfError`]: everything a caller can see: stream failures
//!   surfaced by the collector, input resolution, output writes,
//!   configuration and the job layer.
//!
//! Payload shape problems are never errors. A missing or mistyped field is
//! rendered as blank or replaced by a default.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the order-confirm-pdf library.
#[derive(Debug, Error)]
pub enum OrderPdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Payload file was not found at the given path.
    #[error("Payload file not found: '{path}'\nCheck the path exists and is readable.")]
    PayloadNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a file path, `-`, or a valid HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a file path, '-' or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The input was read but is not JSON.
    #[error("Payload from '{origin}' is not valid JSON: {source}")]
    InvalidPayload {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    // ── Document stream errors ────────────────────────────────────────────
    /// The document stream reported a failure before completing.
    #[error("Document stream failed: {0}")]
    Stream(#[from] SinkError),

    /// The document stream closed without signalling completion.
    #[error("Document stream closed before completion ({received} bytes received)")]
    StreamClosed { received: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Job errors ────────────────────────────────────────────────────────
    /// Job ids become file names, so they are restricted to a safe alphabet.
    #[error("Invalid job id '{id}': use 1-128 characters from [A-Za-z0-9_-]")]
    InvalidJobId { id: String },

    /// The job store could not record status or store the document.
    #[error("Job store error: {detail}")]
    Store { detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failure reported by the document stream.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum SinkError {
    /// A page's drawing operations could not be encoded.
    #[error("page {page}: content stream encoding failed: {detail}")]
    Encode { page: usize, detail: String },

    /// The finished object graph could not be written out.
    #[error("serialisation failed: {0}")]
    Serialize(String),
}
