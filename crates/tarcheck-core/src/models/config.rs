//! Configuration structures for the validation pipeline.
//!
//! All thresholds and defaults live in one immutable value that is passed
//! into each component at construction. Nothing reads ambient state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main configuration for the tarcheck pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TarcheckConfig {
    /// Variance tolerance thresholds.
    pub thresholds: ThresholdConfig,

    /// Per-diem rate lookup configuration.
    pub rates: RateConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Document text extraction configuration.
    pub document: DocumentConfig,
}

/// Cost variance tolerances.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Fixed-dollar tolerance for absolute cost overage.
    pub cost_buffer: Decimal,

    /// Percentage tolerance for relative cost overage.
    pub max_deviation_percent: Decimal,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            cost_buffer: Decimal::new(10, 0),
            max_deviation_percent: Decimal::new(15, 0),
        }
    }
}

/// Per-diem rate lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    /// Base URL of the per-diem rate API.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Default daily M&IE rate when no rate is found.
    pub default_mie: Decimal,

    /// Default daily lodging rate when no rate is found.
    pub default_lodging: Decimal,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.gsa.gov/travel/perdiem/v2".to_string(),
            timeout_secs: 15,
            // Standard CONUS rates used when a city has no published rate.
            default_mie: Decimal::new(68, 0),
            default_lodging: Decimal::new(110, 0),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Apply digit-adjacent OCR confusion corrections (O->0, I/l->1, S->5).
    pub ocr_corrections: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ocr_corrections: true,
        }
    }
}

/// Document text extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Minimum text length to consider direct extraction plausible.
    pub min_text_length: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
        }
    }
}

impl TarcheckConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
