//! Error types for the tarcheck-core library.

use thiserror::Error;

/// Main error type for the tarcheck library.
#[derive(Error, Debug)]
pub enum TarError {
    /// Document processing error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Per-diem rate lookup error.
    #[error("rate lookup error: {0}")]
    Rate(#[from] RateError),

    /// Audit log error.
    #[error("audit log error: {0}")]
    Audit(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to document text extraction.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Failed to open/parse the document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Failed to extract text from the document.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The document is encrypted and cannot be processed.
    #[error("document is encrypted")]
    Encrypted,

    /// The document is empty or has no pages.
    #[error("document has no pages")]
    NoPages,

    /// The document payload could not be decoded.
    #[error("invalid document payload: {0}")]
    InvalidPayload(String),

    /// Unsupported document media type.
    #[error("unsupported document type: {0}")]
    UnsupportedType(String),
}

/// Errors related to TAR field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Required field is missing.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// No usable text was available for extraction.
    #[error("no document text available")]
    NoText,
}

/// Errors related to per-diem rate lookups.
///
/// Lookup failures are recoverable at the call site (callers fall back to
/// configured defaults); these errors only surface when the client itself
/// cannot be constructed.
#[derive(Error, Debug)]
pub enum RateError {
    /// The HTTP client could not be built.
    #[error("failed to build rate client: {0}")]
    Client(String),

    /// The rate source response could not be decoded.
    #[error("malformed rate response: {0}")]
    Decode(String),
}

/// Result type for the tarcheck library.
pub type Result<T> = std::result::Result<T, TarError>;
