//! Core library for travel authorization request (TAR) validation.
//!
//! This crate provides:
//! - Document text extraction (PDF)
//! - Pattern-based TAR field extraction with quality scoring
//! - Per-diem rate lookup against the GSA API
//! - Expected cost calculation, variance validation, and reporting
//! - CSV audit logging and bulk cost-line ingestion

pub mod audit;
pub mod cost;
pub mod document;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod rates;
pub mod report;
pub mod validate;

pub use audit::{AuditSink, CsvAuditLog};
pub use cost::CostCalculator;
pub use document::{DocumentKind, DocumentTextSource, PdfTextSource};
pub use error::{Result, TarError};
pub use extract::{ExtractionOutcome, QualityScore, TarExtractor};
pub use models::config::TarcheckConfig;
pub use models::tar::{
    Confidence, CostBreakdownItem, ExpectedCosts, ItineraryStop, MergedTarData, TarInput,
    ValidationReport, ValidationResult,
};
pub use pipeline::TarPipeline;
pub use rates::{GsaPerDiemClient, RateEntry, RateSource};
pub use report::ReportGenerator;
