//! Document encoding: raw bytes → standard base64.
//!
//! The model receives documents as inline base64 parts. Callers that
//! already hold a data URL (`data:application/pdf;base64,...`) can pass it
//! through [`strip_data_url_prefix`] first.

use crate::error::MindMapError;
use crate::pipeline::input::{Document, DocumentSource};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// Encode bytes as padded standard base64.
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 (an optional data-URL prefix is ignored).
pub fn decode(b64: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(strip_data_url_prefix(b64))
}

/// Drop a leading `data:<mime>;base64,` prefix when present.
pub fn strip_data_url_prefix(s: &str) -> &str {
    if s.starts_with("data:") {
        if let Some((_, payload)) = s.split_once(',') {
            return payload;
        }
    }
    s
}

/// Read a file asynchronously and encode it.
pub async fn read_and_encode(path: &Path) -> Result<String, MindMapError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| MindMapError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    let b64 = encode_bytes(&bytes);
    debug!("Encoded {} → {} bytes base64", path.display(), b64.len());
    Ok(b64)
}

/// Encode a resolved document regardless of where its bytes live.
pub async fn encode_document(doc: &Document) -> Result<String, MindMapError> {
    match &doc.source {
        DocumentSource::Path(path) => read_and_encode(path).await,
        DocumentSource::Bytes(bytes) => {
            let b64 = encode_bytes(bytes);
            debug!("Encoded '{}' → {} bytes base64", doc.name, b64.len());
            Ok(b64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_reproduces_bytes() {
        let samples: [&[u8]; 4] = [b"", b"%PDF-1.7\n", &[0, 255, 1, 254, 128], b"ab"];
        for bytes in samples {
            let encoded = encode_bytes(bytes);
            assert_eq!(decode(&encoded).unwrap(), bytes);
        }
    }

    #[test]
    fn strips_data_url_prefix() {
        assert_eq!(strip_data_url_prefix("data:application/pdf;base64,JVBERg=="), "JVBERg==");
        assert_eq!(strip_data_url_prefix("JVBERg=="), "JVBERg==");
        assert_eq!(decode("data:image/png;base64,AAEC").unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn read_and_encode_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4 hello").unwrap();

        let b64 = read_and_encode(&path).await.unwrap();
        assert_eq!(decode(&b64).unwrap(), b"%PDF-1.4 hello");
    }

    #[tokio::test]
    async fn unreadable_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_and_encode(&dir.path().join("gone.pdf")).await.unwrap_err();
        assert!(matches!(err, MindMapError::ReadFailed { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Read);
    }

    #[tokio::test]
    async fn in_memory_document() {
        let doc = Document::from_bytes("a.png", "image/png", vec![1, 2, 3]);
        assert_eq!(encode_document(&doc).await.unwrap(), "AQID");
    }
}
