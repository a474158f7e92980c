//! Batch command - validate requests aggregated from cost-line CSV exports.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use tarcheck_core::ingest::{aggregate_rows, read_cost_lines};
use tarcheck_core::{CsvAuditLog, TarInput, TarPipeline, ValidationResult};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input CSV file or glob pattern
    #[arg(required = true)]
    input: String,

    /// Directory for per-request JSON results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Append outcomes to a CSV audit log
    #[arg(long)]
    audit_log: Option<PathBuf>,
}

/// Outcome of one aggregated request.
struct BatchResult {
    request_id: String,
    traveler: String,
    result: ValidationResult,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching CSV files found for pattern: {}", args.input);
    }

    // Aggregate in file order so output order is deterministic.
    let mut inputs: Vec<TarInput> = Vec::new();
    for path in &files {
        let rows = read_cost_lines(path)?;
        let aggregated = aggregate_rows(&rows);
        debug!(
            "{}: {} rows -> {} requests",
            path.display(),
            rows.len(),
            aggregated.len()
        );
        inputs.extend(aggregated);
    }

    println!(
        "{} Found {} requests across {} files",
        style("\u{2139}").blue(),
        inputs.len(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let mut pipeline = TarPipeline::new(config)?;
    if let Some(path) = &args.audit_log {
        pipeline = pipeline.with_audit(Box::new(CsvAuditLog::new(path)));
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} requests")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let request_id = input
            .authorization_number
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        let traveler = input.traveler_name.clone().unwrap_or_default();

        let result = pipeline.validate(input);

        if let Some(ref output_dir) = args.output_dir {
            let output_path = output_dir.join(format!("{}.json", sanitize_filename(&request_id)));
            if let Err(e) = fs::write(&output_path, serde_json::to_string_pretty(&result)?) {
                warn!("Failed to write {}: {}", output_path.display(), e);
            }
        }

        results.push(BatchResult {
            request_id,
            traveler,
            result,
        });
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("\u{2713}").green(),
            summary_path.display()
        );
    }

    let valid = results.iter().filter(|r| r.result.is_valid).count();
    let flagged = results
        .iter()
        .filter(|r| r.result.success && !r.result.is_valid)
        .count();
    let failed = results.iter().filter(|r| !r.result.success).count();

    println!();
    println!(
        "{} Validated {} requests in {:?}",
        style("\u{2713}").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} valid, {} flagged, {} failed",
        style(valid).green(),
        style(flagged).yellow(),
        style(failed).red()
    );

    if failed > 0 {
        println!();
        println!("{}", style("Failed requests:").red());
        for result in results.iter().filter(|r| !r.result.success) {
            println!(
                "  - {}: {}",
                result.request_id,
                result.result.errors.join("; ")
            );
        }
    }

    Ok(())
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn write_summary(path: &PathBuf, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "request_id",
        "traveler",
        "status",
        "expected_cost",
        "claimed_cost",
        "variance",
        "variance_percent",
        "message",
    ])?;

    for result in results {
        let status = if !result.result.success {
            "failed"
        } else if result.result.is_valid {
            "valid"
        } else {
            "flagged"
        };

        wtr.write_record([
            &result.request_id,
            &result.traveler,
            status,
            &result.result.expected_cost.to_string(),
            &result.result.claimed_cost.to_string(),
            &result.result.variance.to_string(),
            &result.result.variance_percent.to_string(),
            &result.result.message,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
