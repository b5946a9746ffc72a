//! Error types for the nodqra-mindmap library.
//!
//! Every failure is a [`MindMapError`]. The variants are grouped into three
//! kinds (see [`ErrorKind`]) that decide how a caller should react:
//!
//! * **Validation** — the document was rejected before anything was read.
//!   Ask the user for another file.
//! * **Read** — the bytes could not be obtained (missing file, failed
//!   download). Retrying may help.
//! * **Service** — the hosted model failed, answered with nothing, or
//!   answered with text that does not match the requested structure. The
//!   request is over; nothing partial is ever returned.
//!
//! [`MindMapError::user_message`] collapses each kind into the single
//! localized sentence shown to end users.

use crate::i18n::Language;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the nodqra-mindmap library.
#[derive(Debug, Error)]
pub enum MindMapError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Declared media type is not in the allow-list and the name has no `.pdf` suffix.
    #[error("Unsupported format for '{name}' (declared type: '{mime_type}')\nSupported: PDF, PPTX, JPG, PNG.")]
    UnsupportedFormat { name: String, mime_type: String },

    /// The input string is neither an existing path nor an HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    // ── Read errors ───────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was opened but reading its bytes failed.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Service errors ────────────────────────────────────────────────────
    /// No API key or provider is available.
    #[error("Generative model is not configured.\n{hint}")]
    ProviderNotConfigured { hint: String },

    /// The hosted call failed (transport, HTTP status, quota, auth).
    #[error("Generative service error: {message}")]
    ServiceError { message: String },

    /// The service answered without any text.
    #[error("No response from AI ({stage})")]
    EmptyResponse { stage: &'static str },

    /// The service text is not JSON of the expected shape.
    #[error("Malformed {stage} response: {detail}")]
    MalformedResponse { stage: &'static str, detail: String },

    /// The JSON parsed but breaks an invariant of the structure.
    #[error("Invalid {stage} structure: {detail}")]
    SchemaViolation { stage: &'static str, detail: String },

    // ── Session errors ────────────────────────────────────────────────────
    /// A generation is already running for this session.
    #[error("A document is already being analysed; wait for it to finish")]
    UploadInProgress,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
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

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`MindMapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected document; recoverable by choosing another file.
    Validation,
    /// The document could not be read; recoverable by retrying.
    Read,
    /// The hosted model call failed; terminal for this request.
    Service,
    /// Anything else (configuration, output, session misuse).
    Other,
}

impl MindMapError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        use MindMapError::*;
        match self {
            UnsupportedFormat { .. } | InvalidInput { .. } => ErrorKind::Validation,
            FileNotFound { .. }
            | PermissionDenied { .. }
            | ReadFailed { .. }
            | DownloadFailed { .. }
            | DownloadTimeout { .. } => ErrorKind::Read,
            ProviderNotConfigured { .. }
            | ServiceError { .. }
            | EmptyResponse { .. }
            | MalformedResponse { .. }
            | SchemaViolation { .. } => ErrorKind::Service,
            UploadInProgress | OutputWriteFailed { .. } | InvalidConfig(_) | Internal(_) => {
                ErrorKind::Other
            }
        }
    }

    /// The localized sentence shown to end users.
    ///
    /// Service failures are deliberately indistinguishable here; the
    /// detailed cause is still available through `Display`.
    pub fn user_message(&self, language: Language) -> &'static str {
        let messages = language.messages();
        match self.kind() {
            ErrorKind::Validation => messages.format_error,
            ErrorKind::Read => messages.read_error,
            ErrorKind::Service | ErrorKind::Other => match self {
                MindMapError::UploadInProgress => messages.busy,
                _ => messages.error,
            },
        }
    }
}
