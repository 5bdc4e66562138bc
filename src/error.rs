use std::path::PathBuf;
use thiserror::Error;

use crate::coco::{Collection, ReferenceKind};

/// The main error type for coco2csv operations.
#[derive(Debug, Error)]
pub enum Coco2CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required collection '{key}'")]
    MissingCollection { key: &'static str },

    #[error("Collection '{key}' is not an array")]
    InvalidCollection { key: &'static str },

    #[error("Missing field '{field}' in {collection} record #{index}")]
    MissingField {
        collection: Collection,
        index: usize,
        field: &'static str,
    },

    #[error("Field '{field}' in {collection} record #{index} is not {expected}")]
    InvalidField {
        collection: Collection,
        index: usize,
        field: &'static str,
        expected: &'static str,
    },

    #[error("Duplicate {collection} id {id}")]
    DuplicateId { collection: Collection, id: u64 },

    #[error("Annotation #{annotation_index} references unknown {reference} {id}")]
    UnresolvedReference {
        annotation_index: usize,
        reference: ReferenceKind,
        id: u64,
    },

    #[error("Failed to parse JSON payload '{payload}': {source}")]
    JsonParse {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read archive: {source}")]
    Archive {
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to write CSV to {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("No payloads found in '{source_name}'")]
    NoPayloads { source_name: String },

    #[error("All {failed} payload(s) were skipped")]
    BatchFailed { failed: usize },
}

impl Coco2CsvError {
    /// True for faults meaning "this payload is not a COCO dataset we understand".
    pub fn is_unsupported_format(&self) -> bool {
        matches!(
            self,
            Coco2CsvError::MissingCollection { .. }
                | Coco2CsvError::InvalidCollection { .. }
                | Coco2CsvError::MissingField { .. }
                | Coco2CsvError::InvalidField { .. }
        )
    }

    /// True for faults where the payload parsed but its cross-references are broken.
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            Coco2CsvError::UnresolvedReference { .. } | Coco2CsvError::DuplicateId { .. }
        )
    }
}
