//! Batch report types: what happened to each payload of a run.
//!
//! Mirrors the per-issue reporting style used elsewhere in the crate: a
//! plain list of outcomes plus counting helpers, rendered either as text
//! (`Display`) or as JSON (`Serialize`).

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::error::Coco2CsvError;

/// Report for one source, covering every payload found in it.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchReport {
    /// Display name of the source the payloads came from.
    pub source: String,
    /// One entry per payload, in processing order.
    pub outcomes: Vec<PayloadOutcome>,
}

impl BatchReport {
    /// Create a new empty report for a source.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn add(&mut self, outcome: PayloadOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn converted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PayloadOutcome::Converted { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.converted_count()
    }

    /// Total rows across all converted payloads.
    pub fn total_rows(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                PayloadOutcome::Converted { rows, .. } => *rows,
                PayloadOutcome::Skipped { .. } => 0,
            })
            .sum()
    }

    /// True when there was at least one payload and none converted.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.converted_count() == 0
    }

    /// Outcome for a payload by name.
    pub fn outcome(&self, payload: &str) -> Option<&PayloadOutcome> {
        self.outcomes.iter().find(|o| o.payload() == payload)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source: {}", self.source)?;
        writeln!(
            f,
            "  {} of {} payload(s) converted, {} row(s)",
            self.converted_count(),
            self.outcomes.len(),
            self.total_rows()
        )?;

        for outcome in &self.outcomes {
            if let PayloadOutcome::Converted {
                payload,
                rows,
                duplicates_removed,
                output,
            } = outcome
            {
                write!(f, "  - {}: {} row(s)", payload, rows)?;
                if *duplicates_removed > 0 {
                    write!(f, " ({} duplicate(s) removed)", duplicates_removed)?;
                }
                if let Some(path) = output {
                    write!(f, " -> {}", path.display())?;
                }
                writeln!(f)?;
            }
        }

        let skipped = self.skipped_count();
        if skipped > 0 {
            writeln!(f)?;
            writeln!(f, "Skipped ({}):", skipped)?;
            for outcome in &self.outcomes {
                if let PayloadOutcome::Skipped {
                    payload,
                    reason,
                    message,
                } = outcome
                {
                    writeln!(f, "  - {} [{}]: {}", payload, reason, message)?;
                }
            }
        }

        Ok(())
    }
}

/// What happened to a single payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayloadOutcome {
    Converted {
        payload: String,
        rows: usize,
        duplicates_removed: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<PathBuf>,
    },
    Skipped {
        payload: String,
        reason: SkipReason,
        message: String,
    },
}

impl PayloadOutcome {
    pub fn skipped(payload: impl Into<String>, reason: SkipReason, error: &Coco2CsvError) -> Self {
        PayloadOutcome::Skipped {
            payload: payload.into(),
            reason,
            message: error.to_string(),
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            PayloadOutcome::Converted { payload, .. } | PayloadOutcome::Skipped { payload, .. } => {
                payload
            }
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, PayloadOutcome::Converted { .. })
    }
}

/// Why a payload was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Not a COCO document this tool understands (missing collection or field).
    UnsupportedFormat,
    /// Parsed, but an id is duplicated or a reference does not resolve.
    IntegrityFault,
    /// Could not be read or is not JSON.
    UnreadablePayload,
    /// Transformed, but the output could not be written.
    WriteFailed,
}

impl SkipReason {
    /// Classifies an error raised while reading or transforming a payload.
    pub fn from_error(error: &Coco2CsvError) -> Self {
        if error.is_unsupported_format() {
            SkipReason::UnsupportedFormat
        } else if error.is_integrity_fault() {
            SkipReason::IntegrityFault
        } else if matches!(error, Coco2CsvError::CsvWrite { .. }) {
            SkipReason::WriteFailed
        } else {
            SkipReason::UnreadablePayload
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::UnsupportedFormat => "unsupported_format",
            SkipReason::IntegrityFault => "integrity_fault",
            SkipReason::UnreadablePayload => "unreadable_payload",
            SkipReason::WriteFailed => "write_failed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
