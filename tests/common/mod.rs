#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use serde_json::{json, Value};
use zip::write::SimpleFileOptions;

pub const SAMPLE_VALID: &str = "tests/fixtures/sample_valid.coco.json";
pub const MISSING_CATEGORIES: &str = "tests/fixtures/missing_categories.coco.json";
pub const UNRESOLVED_CATEGORY: &str = "tests/fixtures/unresolved_category.coco.json";
pub const NOT_JSON: &str = "tests/fixtures/not_json.txt";

pub const HEADER: &str =
    "label,image_name,image_width,image_height,x_min,y_min,x_max,y_max,image_url";

/// The single-image, single-annotation document from the join example.
pub fn person_doc() -> Value {
    json!({
        "images": [{"id": 1, "file_name": "a.jpg", "width": 100, "height": 200,
                    "coco_url": "http://x/a.jpg"}],
        "annotations": [{"image_id": 1, "category_id": 7, "bbox": [0, 0, 10, 10]}],
        "categories": [{"id": 7, "name": "person"}]
    })
}

pub fn fixture(path: &str) -> Vec<u8> {
    fs::read(path).expect("read fixture")
}

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(contents).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, zip_bytes(entries)).expect("write zip file");
}
