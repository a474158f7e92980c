//! Document text extraction.

mod pdf;

pub use pdf::PdfTextSource;

/// Declared media type of a document payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Word,
}

impl DocumentKind {
    /// Resolve a declared media type or file extension. Unknown types are
    /// treated as PDF only when the declared type actually says so.
    pub fn from_declared(declared: &str) -> Option<Self> {
        match declared.trim().to_lowercase().as_str() {
            "application/pdf" | "pdf" => Some(DocumentKind::Pdf),
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "doc"
            | "docx" => Some(DocumentKind::Word),
            _ => None,
        }
    }
}

/// Source of plain text for a binary document payload.
///
/// Returns the extracted text, or `None` when the document cannot be read
/// or yields implausibly little text. Extraction failure never fails a
/// validation run; the caller proceeds on manually supplied fields alone.
pub trait DocumentTextSource {
    fn extract_text(&self, bytes: &[u8], kind: DocumentKind) -> Option<String>;
}
