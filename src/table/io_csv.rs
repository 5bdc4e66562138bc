//! CSV writer for the export table.
//!
//! The header is always written, even for an empty table, so every output
//! file carries the nine columns in the same order:
//!
//! ```text
//! label,image_name,image_width,image_height,x_min,y_min,x_max,y_max,image_url
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{ExportTable, COLUMNS};
use crate::error::Coco2CsvError;

/// Writes the table to a CSV file at `path`.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_csv(path: &Path, table: &ExportTable) -> Result<(), Coco2CsvError> {
    let file = File::create(path).map_err(Coco2CsvError::Io)?;
    let writer = BufWriter::new(file);

    write_records(writer, table, path)?
        .flush()
        .map_err(Coco2CsvError::Io)?;

    Ok(())
}

/// Writes the table to a CSV string.
///
/// Useful for testing without file I/O.
pub fn to_csv_string(table: &ExportTable) -> Result<String, Coco2CsvError> {
    let dummy_path = Path::new("<string>");
    let bytes = write_records(Vec::new(), table, dummy_path)?;

    String::from_utf8(bytes).map_err(|e| {
        Coco2CsvError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

fn write_records<W: Write>(
    writer: W,
    table: &ExportTable,
    path: &Path,
) -> Result<W, Coco2CsvError> {
    let to_error = |source: csv::Error| Coco2CsvError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(COLUMNS).map_err(to_error)?;
    for row in table.rows() {
        csv_writer.write_record(row.to_record()).map_err(to_error)?;
    }

    csv_writer
        .into_inner()
        .map_err(|e| Coco2CsvError::Io(e.into_error()))
}
