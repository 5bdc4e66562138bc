//! Fuzz target for splitting source bytes into payloads.
//!
//! Exercises zip detection and member reading on malformed archives.
//!
//! Run with:
//!   cargo +nightly fuzz run archive_split

#![no_main]

use coco2csv::source::{split_payloads, RawSource};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let raw = RawSource {
        name: "fuzz.zip".to_string(),
        bytes: data.to_vec(),
    };
    let _ = split_payloads(raw, &[]);
});
