//! Batch processing: run the transformation over every payload of a source.
//!
//! Payloads are independent. A payload that fails to parse, is not a COCO
//! document, or has broken references is logged and recorded as skipped;
//! the remaining payloads are still processed.

mod report;

pub use report::{BatchReport, PayloadOutcome, SkipReason};

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{error, info};
use serde_json::Value;

use crate::error::Coco2CsvError;
use crate::source::{Payload, UnreadablePayload};
use crate::table::{io_csv, transform, ExportTable};

/// What to do with each successfully transformed table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sink {
    /// Write `<dir>/<payload stem>.csv`.
    CsvDir(PathBuf),
    /// Transform and report only.
    DryRun,
}

impl Sink {
    fn accept(&self, file_stem: &str, table: &ExportTable) -> Result<Option<PathBuf>, Coco2CsvError> {
        match self {
            Sink::CsvDir(dir) => {
                let path = dir.join(format!("{}.csv", file_stem));
                io_csv::write_csv(&path, table)?;
                Ok(Some(path))
            }
            Sink::DryRun => Ok(None),
        }
    }
}

/// Parses a payload's bytes as JSON.
pub fn parse_payload(payload: &Payload) -> Result<Value, Coco2CsvError> {
    serde_json::from_slice(&payload.bytes).map_err(|source| Coco2CsvError::JsonParse {
        payload: payload.name.clone(),
        source,
    })
}

/// Parses and transforms one payload.
pub fn transform_payload(payload: &Payload) -> Result<ExportTable, Coco2CsvError> {
    let doc = parse_payload(payload)?;
    transform(&doc)
}

/// Processes every payload, never stopping on a per-payload failure.
pub fn run_batch(
    source_name: &str,
    entries: Vec<Result<Payload, UnreadablePayload>>,
    sink: &Sink,
) -> BatchReport {
    let mut report = BatchReport::new(source_name);
    let mut used_stems = HashSet::new();

    for entry in entries {
        let payload = match entry {
            Ok(payload) => payload,
            Err(UnreadablePayload { name, error }) => {
                error!("Unable to read {}, skipping: {}", name, error);
                report.add(PayloadOutcome::skipped(
                    name,
                    SkipReason::UnreadablePayload,
                    &error,
                ));
                continue;
            }
        };

        let table = match transform_payload(&payload) {
            Ok(table) => table,
            Err(error) => {
                let reason = SkipReason::from_error(&error);
                log_skip(&payload.name, reason, &error);
                report.add(PayloadOutcome::skipped(payload.name, reason, &error));
                continue;
            }
        };

        let stem = unique_stem(payload.stem(), &mut used_stems);
        match sink.accept(&stem, &table) {
            Ok(output) => {
                info!(
                    "Transformed {} ({} rows, {} duplicates removed)",
                    payload.name,
                    table.len(),
                    table.duplicates_removed()
                );
                report.add(PayloadOutcome::Converted {
                    payload: payload.name,
                    rows: table.len(),
                    duplicates_removed: table.duplicates_removed(),
                    output,
                });
            }
            Err(error) => {
                error!("Unable to write output for {}: {}", payload.name, error);
                report.add(PayloadOutcome::skipped(
                    payload.name,
                    SkipReason::WriteFailed,
                    &error,
                ));
            }
        }
    }

    report
}

fn log_skip(name: &str, reason: SkipReason, error: &Coco2CsvError) {
    match reason {
        SkipReason::UnsupportedFormat => {
            error!("Unsupported format in {}, skipping... ({})", name, error)
        }
        SkipReason::IntegrityFault => {
            error!("Broken references in {}, skipping... ({})", name, error)
        }
        SkipReason::UnreadablePayload | SkipReason::WriteFailed => {
            error!("Unable to process {}, skipping... ({})", name, error)
        }
    }
}

// Archive members in different folders may share a file stem.
fn unique_stem(stem: String, used: &mut HashSet<String>) -> String {
    if used.insert(stem.clone()) {
        return stem;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", stem, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Ensures the output directory for a [`Sink::CsvDir`] exists.
pub fn prepare_output_dir(dir: &Path) -> Result<(), Coco2CsvError> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}
