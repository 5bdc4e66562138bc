//! Integration tests for the COCO -> flat table transformation.

use coco2csv::batch::{run_batch, PayloadOutcome, SkipReason, Sink};
use coco2csv::coco::ReferenceKind;
use coco2csv::source::Payload;
use coco2csv::table::io_csv::to_csv_string;
use coco2csv::table::transform_entities;
use coco2csv::{transform, Coco2CsvError, ExportRow};
use serde_json::json;

mod common;

#[test]
fn join_produces_exact_row() {
    let table = transform(&common::person_doc()).expect("transform failed");

    assert_eq!(
        table.rows(),
        &[ExportRow {
            label: "person".to_string(),
            image_name: "a.jpg".to_string(),
            image_width: 100,
            image_height: 200,
            x_min: 0.0,
            y_min: -10.0,
            x_max: 10.0,
            y_max: 0.0,
            image_url: "http://x/a.jpg".to_string(),
        }]
    );
}

#[test]
fn corners_use_literal_arithmetic() {
    let mut doc = common::person_doc();
    doc["annotations"][0]["bbox"] = json!([10, 20, 5, 8]);

    let table = transform(&doc).expect("transform failed");
    let row = &table.rows()[0];
    assert_eq!(
        (row.x_min, row.y_min, row.x_max, row.y_max),
        (10.0, 12.0, 15.0, 20.0)
    );
}

#[test]
fn one_row_per_resolving_annotation() {
    let doc = json!({
        "images": [
            {"id": 1, "file_name": "a.jpg", "width": 100, "height": 200, "coco_url": "u1"},
            {"id": 2, "file_name": "b.jpg", "width": 300, "height": 400, "coco_url": "u2"}
        ],
        "annotations": [
            {"image_id": 1, "category_id": 7, "bbox": [0, 0, 1, 1]},
            {"image_id": 1, "category_id": 7, "bbox": [0, 0, 2, 2]},
            {"image_id": 2, "category_id": 3, "bbox": [0, 0, 3, 3]},
            {"image_id": 1, "category_id": 3, "bbox": [0, 0, 4, 4]},
            {"image_id": 2, "category_id": 7, "bbox": [0, 0, 5, 5]}
        ],
        "categories": [{"id": 7, "name": "person"}, {"id": 3, "name": "car"}]
    });

    let table = transform(&doc).expect("transform failed");
    assert_eq!(table.len(), 5);

    let summary: Vec<(&str, &str, u32, f64)> = table
        .rows()
        .iter()
        .map(|r| (r.label.as_str(), r.image_name.as_str(), r.image_width, r.x_max))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("person", "a.jpg", 100, 1.0),
            ("person", "a.jpg", 100, 2.0),
            ("car", "b.jpg", 300, 3.0),
            ("car", "a.jpg", 100, 4.0),
            ("person", "b.jpg", 300, 5.0),
        ]
    );
}

#[test]
fn identical_annotations_collapse_and_rerun_is_stable() {
    let mut doc = common::person_doc();
    let ann = doc["annotations"][0].clone();
    doc["annotations"].as_array_mut().unwrap().push(ann);

    let first = transform(&doc).expect("first run");
    let second = transform(&doc).expect("second run");

    assert_eq!(first.len(), 1);
    assert_eq!(first.duplicates_removed(), 1);
    assert_eq!(first, second);
}

#[test]
fn column_order_ignores_input_field_order() {
    let reordered = json!({
        "categories": [{"name": "person", "id": 7}],
        "annotations": [{"bbox": [0, 0, 10, 10], "category_id": 7, "image_id": 1}],
        "images": [{"coco_url": "http://x/a.jpg", "height": 200, "width": 100,
                    "file_name": "a.jpg", "id": 1}]
    });

    let expected = to_csv_string(&transform(&common::person_doc()).unwrap()).unwrap();
    let actual = to_csv_string(&transform(&reordered).unwrap()).unwrap();

    assert_eq!(actual, expected);
    assert_eq!(
        actual,
        format!(
            "{}\nperson,a.jpg,100,200,0,-10,10,0,http://x/a.jpg\n",
            common::HEADER
        )
    );
}

#[test]
fn unresolved_category_is_an_integrity_fault() {
    let doc: serde_json::Value =
        serde_json::from_slice(&common::fixture(common::UNRESOLVED_CATEGORY)).unwrap();

    match transform(&doc) {
        Err(Coco2CsvError::UnresolvedReference {
            annotation_index,
            reference,
            id,
        }) => {
            assert_eq!(annotation_index, 1);
            assert_eq!(reference, ReferenceKind::Category);
            assert_eq!(id, 99);
        }
        other => panic!("expected UnresolvedReference, got {other:?}"),
    }
}

#[test]
fn unresolved_image_is_an_integrity_fault() {
    let mut doc = common::person_doc();
    doc["annotations"][0]["image_id"] = json!(404);

    let err = transform(&doc).unwrap_err();
    assert!(err.is_integrity_fault());
    assert!(err.to_string().contains("image_id 404"));
}

#[test]
fn sample_fixture_transforms() {
    let doc: serde_json::Value =
        serde_json::from_slice(&common::fixture(common::SAMPLE_VALID)).unwrap();
    let entities = coco2csv::coco::extract_entities(&doc).unwrap();
    assert_eq!(entities.annotations.len(), 4);

    let table = transform_entities(&entities).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.duplicates_removed(), 1);

    let chair = &table.rows()[1];
    assert_eq!(chair.label, "chair");
    assert_eq!(chair.image_name, "000000000139.jpg");
    assert!((chair.y_min - (167.76 - 94.87)).abs() < 1e-9);
    assert!((chair.x_max - (7.03 + 149.32)).abs() < 1e-9);
    assert!((chair.y_max - 167.76).abs() < 1e-9);
}

#[test]
fn batch_isolates_malformed_payload() {
    let entries = vec![
        Ok(Payload::new(
            "missing_categories.json",
            common::fixture(common::MISSING_CATEGORIES),
        )),
        Ok(Payload::new("good.json", common::person_doc().to_string())),
    ];

    let report = run_batch("batch", entries, &Sink::DryRun);

    assert_eq!(report.converted_count(), 1);
    assert_eq!(
        report.outcome("missing_categories.json"),
        Some(&PayloadOutcome::Skipped {
            payload: "missing_categories.json".to_string(),
            reason: SkipReason::UnsupportedFormat,
            message: "Missing required collection 'categories'".to_string(),
        })
    );
    assert!(report.outcome("good.json").unwrap().is_converted());
}

#[test]
fn batch_reports_integrity_fault_without_rows() {
    let entries = vec![Ok(Payload::new(
        "unresolved.json",
        common::fixture(common::UNRESOLVED_CATEGORY),
    ))];

    let report = run_batch("batch", entries, &Sink::DryRun);

    assert!(report.all_failed());
    assert_eq!(report.total_rows(), 0);
    assert!(matches!(
        report.outcomes[0],
        PayloadOutcome::Skipped {
            reason: SkipReason::IntegrityFault,
            ..
        }
    ));
}
