//! End-to-end validation pipeline.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{error, info, warn};

use crate::audit::AuditSink;
use crate::cost::CostCalculator;
use crate::document::{DocumentKind, DocumentTextSource, PdfTextSource};
use crate::error::Result;
use crate::extract::TarExtractor;
use crate::models::config::TarcheckConfig;
use crate::models::tar::{
    Confidence, ExtractedRecord, TarInput, ValidationReport, ValidationResult,
};
use crate::rates::{GsaPerDiemClient, RateSource};
use crate::report::ReportGenerator;
use crate::validate;

/// Validation pipeline for one travel authorization request.
///
/// Document text extraction and rate lookup are injected capabilities;
/// [`TarPipeline::new`] wires the production implementations. Every run
/// flows extraction, merging, field checks, cost calculation, and report
/// generation in that order.
pub struct TarPipeline {
    config: TarcheckConfig,
    extractor: TarExtractor,
    documents: Box<dyn DocumentTextSource>,
    rates: Box<dyn RateSource>,
    audit: Option<Box<dyn AuditSink>>,
}

impl TarPipeline {
    /// Pipeline with the production document and rate sources.
    pub fn new(config: TarcheckConfig) -> Result<Self> {
        let documents = Box::new(PdfTextSource::new(config.document.clone()));
        let rates = Box::new(GsaPerDiemClient::new(&config.rates)?);
        Ok(Self::with_sources(config, documents, rates))
    }

    /// Pipeline with caller-supplied sources.
    pub fn with_sources(
        config: TarcheckConfig,
        documents: Box<dyn DocumentTextSource>,
        rates: Box<dyn RateSource>,
    ) -> Self {
        let extractor = TarExtractor::new(config.extraction.clone());
        Self {
            config,
            extractor,
            documents,
            rates,
            audit: None,
        }
    }

    /// Attach an audit sink. Appends are best-effort and never fail a run.
    pub fn with_audit(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Validate one request. Unexpected internal errors are caught here and
    /// reported as a generic failure; the raw error is only logged.
    pub fn validate(&self, input: &TarInput) -> ValidationResult {
        self.validate_full(input).0
    }

    /// Validate one request, also returning the full report when one was
    /// generated.
    pub fn validate_full(&self, input: &TarInput) -> (ValidationResult, Option<ValidationReport>) {
        match self.run(input) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("validation pipeline error: {e}");
                (ValidationResult::system_error(), None)
            }
        }
    }

    fn run(&self, input: &TarInput) -> Result<(ValidationResult, Option<ValidationReport>)> {
        let mut warnings = Vec::new();
        let extracted = self.extract_document(input, &mut warnings);

        let merged = validate::merge(&extracted, input);

        let errors = validate::check(&merged);
        if !errors.is_empty() {
            info!(errors = errors.len(), "field checks failed");
            return Ok((ValidationResult::failure(errors, warnings), None));
        }

        let calculator = CostCalculator::new(self.rates.as_ref(), &self.config.rates);
        let expected = calculator.expected_costs(&merged);

        let generator = ReportGenerator::new(&self.config.thresholds);
        let report = generator.generate(&merged, expected);
        let result = generator.result(&report, warnings);

        if let Some(sink) = &self.audit {
            if let Err(e) = sink.append(&report) {
                warn!("audit append failed: {e}");
            }
        }

        Ok((result, Some(report)))
    }

    /// Decode and extract the attached document, if any. Every failure on
    /// this path degrades to a warning; validation proceeds on manually
    /// supplied fields alone.
    fn extract_document(&self, input: &TarInput, warnings: &mut Vec<String>) -> ExtractedRecord {
        let Some(payload) = input.document.as_deref() else {
            return ExtractedRecord::default();
        };

        let bytes = match BASE64.decode(payload.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("document payload decode failed: {e}");
                warnings.push(
                    "Document payload could not be decoded; validating manually supplied fields only"
                        .to_string(),
                );
                return ExtractedRecord::default();
            }
        };

        let declared = input.document_type.as_deref().unwrap_or("application/pdf");
        let Some(kind) = DocumentKind::from_declared(declared) else {
            warnings.push(format!(
                "Unsupported document type '{}'; validating manually supplied fields only",
                declared
            ));
            return ExtractedRecord::default();
        };

        let Some(text) = self.documents.extract_text(&bytes, kind) else {
            warnings.push(
                "No text could be extracted from the document; validating manually supplied fields only"
                    .to_string(),
            );
            return ExtractedRecord::default();
        };

        let outcome = self.extractor.extract(&text);
        if outcome.quality.confidence == Confidence::Low {
            warnings.push(format!(
                "Extraction confidence is low ({}/{} points)",
                outcome.quality.earned, outcome.quality.possible
            ));
        }
        warnings.extend(outcome.issues);
        outcome.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tar::ItineraryStop;
    use crate::rates::{LodgingRate, RateEntry};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    struct FixedText(&'static str);

    impl DocumentTextSource for FixedText {
        fn extract_text(&self, _bytes: &[u8], _kind: DocumentKind) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    struct NoText;

    impl DocumentTextSource for NoText {
        fn extract_text(&self, _bytes: &[u8], _kind: DocumentKind) -> Option<String> {
            None
        }
    }

    struct FixedRates;

    impl RateSource for FixedRates {
        fn fetch_rate(&self, _city: &str, _state: &str, _year: i32) -> Option<RateEntry> {
            Some(RateEntry {
                meals: dec("79"),
                lodging_by_month: vec![Some(LodgingRate::Flat(dec("250"))); 12],
            })
        }
    }

    struct RecordingSink {
        rows: Rc<RefCell<Vec<String>>>,
    }

    impl AuditSink for RecordingSink {
        fn append(&self, report: &ValidationReport) -> crate::error::Result<()> {
            self.rows.borrow_mut().push(report.traveler.clone());
            Ok(())
        }
    }

    fn pipeline(documents: Box<dyn DocumentTextSource>) -> TarPipeline {
        TarPipeline::with_sources(TarcheckConfig::default(), documents, Box::new(FixedRates))
    }

    fn manual_input() -> TarInput {
        TarInput {
            traveler_name: Some("Jane Roe".to_string()),
            travel_purpose: Some("Program review".to_string()),
            duty_station: Some("Washington, DC".to_string()),
            contact_number: Some("555-123-4567".to_string()),
            estimated_cost: Some(dec("1000")),
            itinerary: vec![
                stop("2025-05-01"),
                stop("2025-05-02"),
                stop("2025-05-03"),
            ],
            ..Default::default()
        }
    }

    fn stop(date: &str) -> ItineraryStop {
        ItineraryStop {
            date: Some(date.to_string()),
            city: Some("Washington".to_string()),
            state: Some("DC".to_string()),
        }
    }

    #[test]
    fn test_manual_only_run() {
        let result = pipeline(Box::new(NoText)).validate(&manual_input());

        assert!(result.success);
        assert_eq!(result.expected_cost, dec("987"));
        assert_eq!(result.claimed_cost, dec("1000"));
        assert_eq!(result.variance, dec("13"));
        // A 13 dollar overage clears the deviation check but not the buffer.
        assert!(!result.is_valid);
        assert_eq!(result.breakdown.len(), 3);
    }

    #[test]
    fn test_missing_fields_terminate_early() {
        let input = TarInput {
            traveler_name: Some("Jane Roe".to_string()),
            ..Default::default()
        };
        let result = pipeline(Box::new(NoText)).validate(&input);

        assert!(!result.success);
        assert!(result.errors.iter().any(|e| e.contains("contactNumber")));
        assert!(result.errors.iter().any(|e| e.contains("estimatedCost")));
        assert!(result.message.contains("Validation failed"));
    }

    #[test]
    fn test_document_drives_extraction() {
        let text = "\
Authorization Number: TA-2025-0042
Name of Traveler: John Q. Public
Duty Station: Washington, DC
Contact Number: 555-123-4567
Purpose of Travel: Annual program review
Departure Date: 05/01/2025
Return Date: 05/03/2025
Total Estimated Cost: $1,000.00

AUTHORIZED OFFICIAL ITINERARY
05/01/2025 Washington, DC
05/02/2025 Washington, DC
05/03/2025 Washington, DC
";
        let input = TarInput {
            document: Some(BASE64.encode(b"%PDF-fake")),
            ..Default::default()
        };

        let result = pipeline(Box::new(FixedText(text))).validate(&input);
        assert!(result.success);
        assert_eq!(result.expected_cost, dec("987"));
        assert_eq!(result.claimed_cost, dec("1000.00"));
    }

    #[test]
    fn test_unreadable_document_degrades_to_manual() {
        let mut input = manual_input();
        input.document = Some(BASE64.encode(b"scanned image"));

        let result = pipeline(Box::new(NoText)).validate(&input);
        assert!(result.success);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("No text could be extracted")));
    }

    #[test]
    fn test_bad_base64_degrades_to_manual() {
        let mut input = manual_input();
        input.document = Some("!!not base64!!".to_string());

        let result = pipeline(Box::new(NoText)).validate(&input);
        assert!(result.success);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("could not be decoded")));
    }

    #[test]
    fn test_audit_sink_receives_reports() {
        let rows = Rc::new(RefCell::new(Vec::new()));
        let sink = Box::new(RecordingSink { rows: rows.clone() });
        let pipeline = pipeline(Box::new(NoText)).with_audit(sink);

        pipeline.validate(&manual_input());
        // Field-check failures never reach the audit log.
        pipeline.validate(&TarInput::default());

        assert_eq!(rows.borrow().as_slice(), ["Jane Roe"]);
    }
}
