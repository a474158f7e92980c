//! Data models for TAR validation.

pub mod config;
pub mod tar;

pub use config::TarcheckConfig;
pub use tar::{
    Confidence, CostBreakdownItem, ExpectedCosts, ExtractedRecord, ItineraryStop, MergedTarData,
    TarInput, ValidationReport, ValidationResult,
};
