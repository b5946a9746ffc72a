//! Input resolution and document validation.
//!
//! A document is accepted on its *declared* media type alone: the type
//! must be one of [`SUPPORTED_MIME_TYPES`], or the name must end in
//! `.pdf`. Content is never sniffed. Local files carry no declared type,
//! so one is derived from the extension the way a browser file picker
//! would; URL downloads use the `Content-Type` header.

use crate::error::MindMapError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_PPTX: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Declared media types accepted without looking at the file name.
pub const SUPPORTED_MIME_TYPES: [&str; 4] = [MIME_PDF, MIME_JPEG, MIME_PNG, MIME_PPTX];

/// Fallback declared type for unknown extensions.
pub const MIME_UNKNOWN: &str = "application/octet-stream";

/// An accepted document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Jpeg,
    Png,
    Pptx,
}

impl DocumentKind {
    /// The media type sent to the model.
    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => MIME_PDF,
            DocumentKind::Jpeg => MIME_JPEG,
            DocumentKind::Png => MIME_PNG,
            DocumentKind::Pptx => MIME_PPTX,
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            MIME_PDF => Some(DocumentKind::Pdf),
            MIME_JPEG => Some(DocumentKind::Jpeg),
            MIME_PNG => Some(DocumentKind::Png),
            MIME_PPTX => Some(DocumentKind::Pptx),
            _ => None,
        }
    }
}

/// Accept or reject a document by its declared type and name.
///
/// A name ending in `.pdf` is accepted whatever its declared type and is
/// then treated as a PDF.
pub fn validate_document(name: &str, declared_mime: &str) -> Result<DocumentKind, MindMapError> {
    if let Some(kind) = DocumentKind::from_mime(declared_mime) {
        return Ok(kind);
    }
    if name.ends_with(".pdf") {
        debug!(
            "Accepting '{}' by name despite declared type '{}'",
            name, declared_mime
        );
        return Ok(DocumentKind::Pdf);
    }
    Err(MindMapError::UnsupportedFormat {
        name: name.to_string(),
        mime_type: declared_mime.to_string(),
    })
}

/// Derive a declared media type from a file extension (case-insensitive).
pub fn declared_mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => MIME_PDF,
        Some("jpg") | Some("jpeg") => MIME_JPEG,
        Some("png") => MIME_PNG,
        Some("pptx") => MIME_PPTX,
        _ => MIME_UNKNOWN,
    }
}

/// Where the document bytes live.
#[derive(Debug)]
pub enum DocumentSource {
    /// A local file, read lazily.
    Path(PathBuf),
    /// Bytes already in memory (downloads, embedders).
    Bytes(Vec<u8>),
}

/// A user-provided document awaiting validation.
#[derive(Debug)]
pub struct Document {
    pub name: String,
    pub declared_mime: String,
    pub source: DocumentSource,
}

impl Document {
    /// An in-memory document with an explicit declared type.
    pub fn from_bytes(name: impl Into<String>, declared_mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_mime: declared_mime.into(),
            source: DocumentSource::Bytes(bytes),
        }
    }

    pub fn kind(&self) -> Result<DocumentKind, MindMapError> {
        validate_document(&self.name, &self.declared_mime)
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a local path or HTTP(S) URL to a [`Document`].
///
/// Nothing is validated here beyond existence and readability.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<Document, MindMapError> {
    if input.trim().is_empty() {
        return Err(MindMapError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

fn resolve_local(path_str: &str) -> Result<Document, MindMapError> {
    let path = PathBuf::from(path_str);

    if !path.is_file() {
        return Err(MindMapError::FileNotFound { path });
    }

    if let Err(e) = std::fs::File::open(&path) {
        return Err(if e.kind() == std::io::ErrorKind::PermissionDenied {
            MindMapError::PermissionDenied { path }
        } else {
            MindMapError::ReadFailed { path, source: e }
        });
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_str.to_string());
    let declared_mime = declared_mime_for_path(&path).to_string();

    debug!("Resolved local document: {} ({})", path.display(), declared_mime);
    Ok(Document {
        name,
        declared_mime,
        source: DocumentSource::Path(path),
    })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<Document, MindMapError> {
    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| MindMapError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            MindMapError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            MindMapError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(MindMapError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let declared_mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(content_type_essence)
        .unwrap_or_else(|| MIME_UNKNOWN.to_string());
    let name = filename_from_url(url);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| MindMapError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes ({})", bytes.len(), declared_mime);
    Ok(Document::from_bytes(name, declared_mime, bytes.to_vec()))
}

/// `"application/pdf; charset=binary"` → `"application/pdf"`.
fn content_type_essence(header: &str) -> String {
    header
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Last non-empty URL path segment, or `"download"`.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut s| s.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty())
        .unwrap_or_else(|| "download".to_string())
}
