//! Fuzz target for the COCO payload transform.
//!
//! Arbitrary bytes go through JSON parsing, extraction, join and dedup.
//! Errors are expected; panics are not.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_transform

#![no_main]

use coco2csv::batch::transform_payload;
use coco2csv::source::Payload;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // 10MB cap keeps the fuzzer out of OOM territory.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let payload = Payload::new("fuzz.json", data);
    if let Ok(table) = transform_payload(&payload) {
        let _ = coco2csv::table::io_csv::to_csv_string(&table);
    }
});
