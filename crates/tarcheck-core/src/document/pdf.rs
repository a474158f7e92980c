//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use crate::error::DocumentError;
use crate::models::config::DocumentConfig;

use super::{DocumentKind, DocumentTextSource};

/// Production text source backed by lopdf (structure checks) and
/// pdf-extract (text). Word-processing payloads are not supported and
/// report no text.
pub struct PdfTextSource {
    config: DocumentConfig,
}

impl PdfTextSource {
    pub fn new(config: DocumentConfig) -> Self {
        Self { config }
    }

    fn extract_pdf(&self, bytes: &[u8]) -> Result<String, DocumentError> {
        let mut doc =
            Document::load_mem(bytes).map_err(|e| DocumentError::Parse(e.to_string()))?;

        // PDFs protected with an empty owner password are common in
        // scanned form exports; anything stronger is rejected.
        let raw = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(DocumentError::Encrypted);
            }
            debug!("decrypted PDF with empty password");
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| DocumentError::Parse(e.to_string()))?;
            decrypted
        } else {
            bytes.to_vec()
        };

        if doc.get_pages().is_empty() {
            return Err(DocumentError::NoPages);
        }

        pdf_extract::extract_text_from_mem(&raw)
            .map_err(|e| DocumentError::TextExtraction(e.to_string()))
    }
}

impl DocumentTextSource for PdfTextSource {
    fn extract_text(&self, bytes: &[u8], kind: DocumentKind) -> Option<String> {
        if kind != DocumentKind::Pdf {
            warn!(?kind, "unsupported document type, skipping text extraction");
            return None;
        }

        let text = match self.extract_pdf(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("PDF text extraction failed: {e}");
                return None;
            }
        };

        // A nearly empty result usually means a scanned image PDF, which
        // pattern extraction cannot use.
        if text.trim().len() < self.config.min_text_length {
            warn!(
                chars = text.trim().len(),
                min = self.config.min_text_length,
                "extracted text too short to be usable"
            );
            return None;
        }

        debug!(chars = text.len(), "PDF text extracted");
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> PdfTextSource {
        PdfTextSource::new(DocumentConfig::default())
    }

    #[test]
    fn test_garbage_bytes_yield_none() {
        assert!(source().extract_text(b"not a pdf", DocumentKind::Pdf).is_none());
    }

    #[test]
    fn test_word_payload_yields_none() {
        assert!(source().extract_text(b"PK\x03\x04", DocumentKind::Word).is_none());
    }

    #[test]
    fn test_empty_payload_yields_none() {
        assert!(source().extract_text(b"", DocumentKind::Pdf).is_none());
    }
}
