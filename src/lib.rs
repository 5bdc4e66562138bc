//! coco2csv: flatten COCO annotation datasets into a CSV table.
//!
//! A COCO dataset spreads one bounding box over three collections (images,
//! annotations, categories). This crate joins them back together and emits
//! one row per box with the fixed columns
//!
//! ```text
//! label, image_name, image_width, image_height, x_min, y_min, x_max, y_max, image_url
//! ```
//!
//! # Modules
//!
//! - [`coco`]: COCO entity records and the extractor
//! - [`table`]: join, corner normalization, dedup, CSV export
//! - [`source`]: reading files, URLs and zip archives into payloads
//! - [`batch`]: per-payload processing with fault isolation and reporting
//! - [`error`]: Error types for coco2csv operations

pub mod batch;
pub mod coco;
pub mod error;
pub mod logging;
pub mod source;
pub mod table;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::info;

pub use error::Coco2CsvError;
pub use table::{transform, ExportRow, ExportTable};

use batch::{prepare_output_dir, run_batch, Sink};
use source::{split_payloads, Source};

/// The coco2csv CLI application.
#[derive(Parser)]
#[command(name = "coco2csv")]
#[command(version, about)]
struct Cli {
    /// COCO source: a JSON file, a zip archive, or an http(s) URL.
    #[arg(env = "COCO2CSV_SOURCE")]
    source: String,

    /// Directory for the CSV files (one per converted payload).
    #[arg(short, long, default_value = ".", env = "COCO2CSV_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Only process this archive member (repeatable).
    #[arg(long = "member", value_name = "NAME")]
    members: Vec<String>,

    /// Network timeout in seconds for URL sources.
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Output format for the summary report.
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,

    /// Transform and report without writing CSV files.
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the coco2csv CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), Coco2CsvError> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let source = Source::parse(&cli.source);
    let raw = source.fetch(Duration::from_secs(cli.timeout))?;
    let entries = split_payloads(raw, &cli.members)?;

    let sink = if cli.dry_run {
        Sink::DryRun
    } else {
        prepare_output_dir(&cli.output_dir)?;
        Sink::CsvDir(cli.output_dir.clone())
    };

    let report = run_batch(&source.to_string(), entries, &sink);
    info!(
        "{} of {} payload(s) converted",
        report.converted_count(),
        report.outcomes.len()
    );

    match cli.report {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| Coco2CsvError::Io(e.into()))?;
            println!("{}", json);
        }
        ReportFormat::Text => print!("{}", report),
    }

    if report.all_failed() {
        return Err(Coco2CsvError::BatchFailed {
            failed: report.skipped_count(),
        });
    }
    Ok(())
}
