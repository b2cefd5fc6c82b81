//! Batch command - ingest multiple payroll slip files.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{error, warn};

use payslip_core::{AnalyzeConfig, ConsistencyResult, IngestOutcome, Ingestor, JsonFileStore, MemoryStore};

use super::load_config;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Persist records into this JSON store file
    #[arg(long)]
    store: Option<PathBuf>,

    /// Write a summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// One row of the summary CSV.
#[derive(Serialize)]
struct SummaryRow {
    filename: String,
    user_id: String,
    period: String,
    pay_type: String,
    status: String,
    total_gross: i64,
    total_deduction: i64,
    other_payment: i64,
    transfer_amount: i64,
    diff: String,
    error: String,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let credentials = AnalyzeConfig::from_env()?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let ingestor = Ingestor::new(credentials, &config)?;
    // Records land in the JSON store when one is given, otherwise they are
    // only reported.
    let mut json_store = args.store.as_ref().map(JsonFileStore::new);
    let mut scratch_store = MemoryStore::new();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut rows: Vec<SummaryRow> = Vec::new();
    let mut failures = 0usize;

    for path in &files {
        let blob_path = path.to_string_lossy().to_string();
        pb.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );

        let outcome = fs::read(path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| {
                let result = match json_store.as_mut() {
                    Some(store) => ingestor.ingest(store, &blob_path, bytes),
                    None => ingestor.ingest(&mut scratch_store, &blob_path, bytes),
                };
                Ok(result?)
            });

        match outcome {
            Ok(outcome) => rows.push(summary_row(&outcome)),
            Err(e) => {
                failures += 1;
                rows.push(failure_row(&blob_path, &e));
                if args.continue_on_error {
                    warn!(blob_path, "ingest failed: {:#}", e);
                } else {
                    pb.finish_and_clear();
                    error!(blob_path, "ingest failed: {:#}", e);
                    return Err(e);
                }
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if let Some(summary_path) = &args.summary {
        let mut writer = csv::Writer::from_path(summary_path)?;
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        println!(
            "{} Summary written to {}",
            style("ℹ").blue(),
            summary_path.display()
        );
    }

    let processed = files.len() - failures;
    println!(
        "{} Processed {processed}/{} files in {:.1}s",
        style("✔").green(),
        files.len(),
        start.elapsed().as_secs_f64()
    );

    if failures > 0 && !args.continue_on_error {
        anyhow::bail!("{failures} files failed");
    }
    Ok(())
}

fn summary_row(outcome: &IngestOutcome) -> SummaryRow {
    let record = &outcome.record;
    let diff = match &outcome.consistency {
        Some(ConsistencyResult::Checked { diff, .. }) => diff.to_string(),
        _ => String::new(),
    };
    SummaryRow {
        filename: record.filename.clone(),
        user_id: record.user_id.clone(),
        period: format!("{:04}-{:02}", record.year, record.month),
        pay_type: record.pay_type.as_str().to_string(),
        status: record.status.as_str().to_string(),
        total_gross: record.total_gross,
        total_deduction: record.total_deduction,
        other_payment: record.other_payment,
        transfer_amount: record.transfer_amount,
        diff,
        error: String::new(),
    }
}

fn failure_row(blob_path: &str, error: &anyhow::Error) -> SummaryRow {
    SummaryRow {
        filename: blob_path
            .rsplit('/')
            .next()
            .unwrap_or(blob_path)
            .to_string(),
        user_id: String::new(),
        period: String::new(),
        pay_type: String::new(),
        status: "error".to_string(),
        total_gross: 0,
        total_deduction: 0,
        other_payment: 0,
        transfer_amount: 0,
        diff: String::new(),
        error: format!("{error:#}"),
    }
}
