//! The flat export table and the pipeline that builds it.
//!
//! ```text
//! COCO JSON ──extract──▶ Entities ──join──▶ JoinedAnnotation ──normalize──▶ ExportRow
//!                                                                            │
//!                                                       ExportTable ◀──dedup─┘
//! ```
//!
//! # Example
//!
//! ```
//! use coco2csv::table::transform;
//!
//! let doc = serde_json::json!({
//!     "images": [{"id": 1, "file_name": "a.jpg", "width": 100, "height": 200,
//!                 "coco_url": "http://x/a.jpg"}],
//!     "annotations": [{"image_id": 1, "category_id": 7, "bbox": [0, 0, 10, 10]}],
//!     "categories": [{"id": 7, "name": "person"}]
//! });
//!
//! let table = transform(&doc)?;
//! assert_eq!(table.rows()[0].label, "person");
//! assert_eq!(table.rows()[0].y_min, -10.0);
//! # Ok::<(), coco2csv::Coco2CsvError>(())
//! ```

pub mod geometry;
pub mod io_csv;
pub mod join;

use std::collections::HashSet;

use log::{debug, warn};
use serde_json::Value;

use crate::coco::{extract_entities, Entities};
use crate::error::Coco2CsvError;

pub use geometry::Corners;
pub use join::{join_annotations, JoinedAnnotation};

/// Export columns, in the order they are written.
pub const COLUMNS: [&str; 9] = [
    "label",
    "image_name",
    "image_width",
    "image_height",
    "x_min",
    "y_min",
    "x_max",
    "y_max",
    "image_url",
];

/// One row of the export: a labelled, corner-form box plus its image metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportRow {
    pub label: String,
    pub image_name: String,
    pub image_width: u32,
    pub image_height: u32,
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub image_url: String,
}

impl ExportRow {
    /// Merges the corner-form box into a joined annotation row.
    pub fn from_joined(joined: &JoinedAnnotation<'_>) -> Self {
        let corners = Corners::from_coco_bbox(joined.bbox);
        if !corners.is_finite() {
            warn!(
                "non-finite corners for '{}' on {}: {:?}",
                joined.label, joined.image.file_name, corners
            );
        }

        Self {
            label: joined.label.to_string(),
            image_name: joined.image.file_name.clone(),
            image_width: joined.image.width,
            image_height: joined.image.height,
            x_min: corners.x_min,
            y_min: corners.y_min,
            x_max: corners.x_max,
            y_max: corners.y_max,
            image_url: joined.image.coco_url.clone(),
        }
    }

    /// The corner coordinates of this row.
    pub fn corners(&self) -> Corners {
        Corners {
            x_min: self.x_min,
            y_min: self.y_min,
            x_max: self.x_max,
            y_max: self.y_max,
        }
    }

    /// Cell values as strings, in [`COLUMNS`] order.
    ///
    /// Coordinates use the shortest form that round-trips, so integral values
    /// print without a fractional part (`10`, not `10.0`).
    pub fn to_record(&self) -> [String; 9] {
        [
            self.label.clone(),
            self.image_name.clone(),
            self.image_width.to_string(),
            self.image_height.to_string(),
            self.x_min.to_string(),
            self.y_min.to_string(),
            self.x_max.to_string(),
            self.y_max.to_string(),
            self.image_url.clone(),
        ]
    }

    fn key(&self) -> RowKey<'_> {
        RowKey {
            label: &self.label,
            image_name: &self.image_name,
            image_width: self.image_width,
            image_height: self.image_height,
            corners: self.corners().to_array().map(canonical_bits),
            image_url: &self.image_url,
        }
    }
}

/// Whole-row identity used for deduplication.
#[derive(PartialEq, Eq, Hash)]
struct RowKey<'a> {
    label: &'a str,
    image_name: &'a str,
    image_width: u32,
    image_height: u32,
    corners: [u64; 4],
    image_url: &'a str,
}

// -0.0 and 0.0 compare equal as floats and must collapse to one row.
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

/// The final export: distinct rows, first occurrence kept, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportTable {
    rows: Vec<ExportRow>,
    duplicates_removed: usize,
}

impl ExportTable {
    /// Builds a table, dropping rows identical to an earlier one in every column.
    pub fn from_rows(rows: Vec<ExportRow>) -> Self {
        let keep: Vec<bool> = {
            let mut seen = HashSet::with_capacity(rows.len());
            rows.iter().map(|row| seen.insert(row.key())).collect()
        };

        let total = rows.len();
        let rows: Vec<ExportRow> = rows
            .into_iter()
            .zip(keep)
            .filter_map(|(row, keep)| keep.then_some(row))
            .collect();
        let duplicates_removed = total - rows.len();

        if duplicates_removed > 0 {
            debug!("removed {} duplicate row(s)", duplicates_removed);
        }

        Self {
            rows,
            duplicates_removed,
        }
    }

    pub fn rows(&self) -> &[ExportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// How many rows the deduplication step collapsed.
    pub fn duplicates_removed(&self) -> usize {
        self.duplicates_removed
    }
}

/// Runs the full transformation on a parsed COCO document.
///
/// # Errors
/// Any extraction error (missing collection or field, duplicate id) or an
/// unresolved `image_id` / `category_id` aborts the whole document.
pub fn transform(doc: &Value) -> Result<ExportTable, Coco2CsvError> {
    let entities = extract_entities(doc)?;
    transform_entities(&entities)
}

/// Join, normalize and deduplicate already extracted entities.
pub fn transform_entities(entities: &Entities) -> Result<ExportTable, Coco2CsvError> {
    let joined = join_annotations(entities)?;
    let rows = joined.iter().map(ExportRow::from_joined).collect();
    Ok(ExportTable::from_rows(rows))
}
