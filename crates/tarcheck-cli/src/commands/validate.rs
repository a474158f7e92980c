//! Validate command - check a single travel authorization request.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::{debug, info};

use tarcheck_core::{
    CsvAuditLog, TarInput, TarPipeline, ValidationReport, ValidationResult,
};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Input file: a JSON request or a PDF document
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Traveler name (overrides extracted value)
    #[arg(long)]
    traveler: Option<String>,

    /// Purpose of travel
    #[arg(long)]
    purpose: Option<String>,

    /// Destination city
    #[arg(long)]
    city: Option<String>,

    /// Destination state (two-letter code)
    #[arg(long)]
    state: Option<String>,

    /// Contact phone number
    #[arg(long)]
    contact: Option<String>,

    /// Claimed total cost
    #[arg(long)]
    cost: Option<Decimal>,

    /// Departure date (MM/DD/YYYY or YYYY-MM-DD)
    #[arg(long)]
    depart: Option<String>,

    /// Return date (MM/DD/YYYY or YYYY-MM-DD)
    #[arg(long = "return")]
    return_date: Option<String>,

    /// Append the outcome to a CSV audit log
    #[arg(long)]
    audit_log: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: ValidateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut input = read_input(&args.input)?;
    apply_overrides(&mut input, &args);

    info!("Validating request from {}", args.input.display());

    let mut pipeline = TarPipeline::new(config)?;
    if let Some(path) = &args.audit_log {
        pipeline = pipeline.with_audit(Box::new(CsvAuditLog::new(path)));
    }

    let (result, report) = pipeline.validate_full(&input);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&result)?,
        OutputFormat::Text => format_text(&result, report.as_ref()),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("\u{2713}").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total validation time: {:?}", start.elapsed());

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

/// Build a request from the input file. JSON files are decoded directly;
/// PDF files become a document payload for the pipeline to extract.
fn read_input(path: &PathBuf) -> anyhow::Result<TarInput> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "json" => {
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        "pdf" => {
            let bytes = fs::read(path)?;
            Ok(TarInput {
                document: Some(BASE64.encode(bytes)),
                document_type: Some("application/pdf".to_string()),
                ..Default::default()
            })
        }
        _ => anyhow::bail!("Unsupported input format: {}", extension),
    }
}

fn apply_overrides(input: &mut TarInput, args: &ValidateArgs) {
    if args.traveler.is_some() {
        input.traveler_name = args.traveler.clone();
    }
    if args.purpose.is_some() {
        input.travel_purpose = args.purpose.clone();
    }
    if args.city.is_some() {
        input.city = args.city.clone();
    }
    if args.state.is_some() {
        input.state = args.state.clone();
    }
    if args.contact.is_some() {
        input.contact_number = args.contact.clone();
    }
    if args.cost.is_some() {
        input.estimated_cost = args.cost;
    }
    if args.depart.is_some() {
        input.departure_date = args.depart.clone();
    }
    if args.return_date.is_some() {
        input.return_date = args.return_date.clone();
    }
}

fn format_text(result: &ValidationResult, report: Option<&ValidationReport>) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", result.message));

    if result.success {
        output.push('\n');
        output.push_str(&format!("Expected cost: ${}\n", result.expected_cost));
        output.push_str(&format!("Claimed cost:  ${}\n", result.claimed_cost));
        output.push_str(&format!(
            "Variance:      ${} ({}%)\n",
            result.variance, result.variance_percent
        ));

        if !result.breakdown.is_empty() {
            output.push('\n');
            output.push_str("Breakdown:\n");
            for item in &result.breakdown {
                output.push_str(&format!(
                    "  {} {}  M&IE ${}  Lodging ${}  Total ${}\n",
                    item.date, item.location, item.mie, item.lodging, item.total
                ));
            }
        }
    }

    if !result.errors.is_empty() {
        output.push('\n');
        output.push_str("Errors:\n");
        for error in &result.errors {
            output.push_str(&format!("  - {}\n", error));
        }
    }

    if !result.warnings.is_empty() {
        output.push('\n');
        output.push_str("Warnings:\n");
        for warning in &result.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    if let Some(report) = report {
        if !report.recommendations.is_empty() {
            output.push('\n');
            output.push_str("Recommendations:\n");
            for recommendation in &report.recommendations {
                output.push_str(&format!("  - {}\n", recommendation));
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_text_failure_lists_errors() {
        let result = ValidationResult::failure(
            vec!["Missing required field: contactNumber".to_string()],
            vec!["No text could be extracted from the document".to_string()],
        );
        let text = format_text(&result, None);

        assert!(text.contains("Validation failed"));
        assert!(text.contains("- Missing required field: contactNumber"));
        assert!(text.contains("Warnings:"));
    }
}
