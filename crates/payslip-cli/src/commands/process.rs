//! Process command - ingest a single payroll slip file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::debug;

use payslip_core::{
    check_transfer_consistency, AnalyzeConfig, CanonicalFields, ConsistencyResult, IngestOutcome,
    Ingestor, JsonFileStore, PayslipAnalyzer,
};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required_unless_present = "url", conflicts_with = "url")]
    input: Option<PathBuf>,

    /// Analyze a remote document by URL (e.g. a blob SAS URL) instead of a
    /// local file
    #[arg(long)]
    url: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Persist the record into this JSON store file
    #[arg(long)]
    store: Option<PathBuf>,

    /// Skip the transfer consistency check
    #[arg(long)]
    no_validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

#[derive(Serialize)]
struct ProcessReport {
    fields: CanonicalFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    consistency: Option<ConsistencyResult>,
    processing_time_ms: u64,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.no_validate {
        config.ingest.validate_before_persist = false;
    }
    let credentials = AnalyzeConfig::from_env()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message("Analyzing document...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));

    let report = match (&args.input, &args.url, &args.store) {
        (Some(input), _, Some(store_path)) => {
            // Full pipeline: analyze, validate, persist.
            if !input.exists() {
                anyhow::bail!("Input file not found: {}", input.display());
            }
            let bytes = fs::read(input)?;
            let ingestor = Ingestor::new(credentials, &config)?;
            let mut store = JsonFileStore::new(store_path);
            let IngestOutcome {
                record,
                consistency,
            } = ingestor.ingest(&mut store, &input.to_string_lossy(), bytes)?;
            debug!(row_key = %record.row_key(), "record persisted");
            ProcessReport {
                fields: CanonicalFields {
                    total_gross: record.total_gross,
                    total_deduction: record.total_deduction,
                    other_payment: record.other_payment,
                    transfer_amount: record.transfer_amount,
                },
                consistency,
                processing_time_ms: start.elapsed().as_millis() as u64,
            }
        }
        (input, url, store) => {
            if store.is_some() {
                anyhow::bail!("--store requires a local input file");
            }
            let analyzer = PayslipAnalyzer::new(credentials, config.poll.clone())?;
            let fields = match (input, url) {
                (Some(input), _) => {
                    if !input.exists() {
                        anyhow::bail!("Input file not found: {}", input.display());
                    }
                    analyzer.analyze_bytes(fs::read(input)?, "application/pdf")?
                }
                (None, Some(url)) => analyzer.analyze_url(url)?,
                // clap guarantees one of the two is present.
                (None, None) => unreachable!(),
            };
            let consistency = (!args.no_validate).then(|| check_transfer_consistency(&fields));
            ProcessReport {
                fields,
                consistency,
                processing_time_ms: start.elapsed().as_millis() as u64,
            }
        }
    };

    spinner.finish_and_clear();

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Text => render_text(&report),
    };

    match args.output {
        Some(path) => fs::write(path, rendered)?,
        None => println!("{rendered}"),
    }

    Ok(())
}

fn render_text(report: &ProcessReport) -> String {
    let mut out = String::new();
    let fields = &report.fields;
    out.push_str(&format!("total_gross:     {}\n", fields.total_gross));
    out.push_str(&format!("total_deduction: {}\n", fields.total_deduction));
    out.push_str(&format!("other_payment:   {}\n", fields.other_payment));
    out.push_str(&format!("transfer_amount: {}\n", fields.transfer_amount));

    match &report.consistency {
        Some(ConsistencyResult::Checked { ok: true, .. }) => {
            out.push_str(&format!("{} amounts reconcile\n", style("✔").green()));
        }
        Some(ConsistencyResult::Checked { diff, .. }) => {
            out.push_str(&format!(
                "{} transfer amount off by {}\n",
                style("✘").red(),
                diff
            ));
        }
        Some(ConsistencyResult::InvalidNumber { detail, .. }) => {
            out.push_str(&format!(
                "{} invalid number format: {}\n",
                style("✘").red(),
                detail
            ));
        }
        None => {}
    }
    out.push_str(&format!("({} ms)\n", report.processing_time_ms));
    out
}
