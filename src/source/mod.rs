//! Payload acquisition: where the COCO documents come from.
//!
//! A source is either a local file or (with the `remote` feature) an HTTP(S)
//! URL. Its bytes are either a zip archive, in which case every member is a
//! separate payload, or a single raw JSON document.
//!
//! Nothing in here knows about COCO; it only hands named byte buffers to the
//! batch runner.

#[cfg(feature = "remote")]
mod fetch;

use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::Coco2CsvError;

/// Where to read the dataset from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// Interprets `http://` and `https://` prefixes as URLs, anything else as a path.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(raw.to_string())
        } else {
            Source::Path(PathBuf::from(raw))
        }
    }

    /// Display name used for the payload when the source is not an archive.
    pub fn name(&self) -> String {
        match self {
            Source::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Source::Url(url) => url_basename(url),
        }
    }

    /// Reads the whole source into memory.
    ///
    /// # Errors
    /// Any failure here is fatal for the run: without bytes there are no
    /// payloads to process.
    pub fn fetch(&self, timeout: Duration) -> Result<RawSource, Coco2CsvError> {
        let bytes = match self {
            Source::Path(path) => fs::read(path)?,
            Source::Url(url) => fetch_url(url, timeout)?,
        };
        info!("read {} bytes from {}", bytes.len(), self);
        Ok(RawSource {
            name: self.name(),
            bytes,
        })
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

#[cfg(feature = "remote")]
fn fetch_url(url: &str, timeout: Duration) -> Result<Vec<u8>, Coco2CsvError> {
    fetch::download(url, timeout)
}

#[cfg(not(feature = "remote"))]
fn fetch_url(url: &str, _timeout: Duration) -> Result<Vec<u8>, Coco2CsvError> {
    Err(Coco2CsvError::UnsupportedSource(format!(
        "'{}' (URL sources need the 'remote' feature)",
        url
    )))
}

fn url_basename(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .unwrap_or("download.json")
        .to_string()
}

/// The undivided bytes of a source.
#[derive(Clone, Debug)]
pub struct RawSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One JSON document to transform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    /// Archive member name, or the source name for raw JSON.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Payload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// File stem of the payload name, used to name its CSV output.
    pub fn stem(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "payload".to_string())
    }
}

/// An archive member that could not be read.
#[derive(Debug)]
pub struct UnreadablePayload {
    pub name: String,
    pub error: Coco2CsvError,
}

/// Splits a source into payloads.
///
/// A zip archive yields one payload per file member, in archive order,
/// restricted to `members` when that list is non-empty. Anything the zip
/// reader rejects as not being an archive is treated as a single raw JSON
/// payload named after the source.
///
/// # Errors
/// - [`Coco2CsvError::Archive`] if the bytes are a zip archive this reader
///   does not support
/// - [`Coco2CsvError::NoPayloads`] if no member survives the filter
pub fn split_payloads(
    raw: RawSource,
    members: &[String],
) -> Result<Vec<Result<Payload, UnreadablePayload>>, Coco2CsvError> {
    let reason = match ZipArchive::new(Cursor::new(raw.bytes.as_slice())) {
        Ok(archive) => return archive_payloads(&raw.name, archive, members),
        Err(ZipError::InvalidArchive(reason)) => reason.to_string(),
        // An in-memory cursor only fails I/O on truncated or garbage data.
        Err(ZipError::Io(e)) => e.to_string(),
        Err(source) => return Err(Coco2CsvError::Archive { source }),
    };

    info!(
        "'{}' is not a zip archive, reading it as a single JSON document",
        raw.name
    );
    debug!("zip reader: {}", reason);
    if !members.is_empty() {
        warn!(
            "'{}' is not an archive, ignoring requested member(s) {}",
            raw.name,
            members.join(", ")
        );
    }
    Ok(vec![Ok(Payload::new(raw.name, raw.bytes))])
}

fn archive_payloads(
    source_name: &str,
    mut archive: ZipArchive<Cursor<&[u8]>>,
    members: &[String],
) -> Result<Vec<Result<Payload, UnreadablePayload>>, Coco2CsvError> {
    info!("'{}' is a zip archive with {} entries", source_name, archive.len());

    let mut payloads = Vec::new();
    for index in 0..archive.len() {
        let mut file = match archive.by_index(index) {
            Ok(file) => file,
            Err(source) => {
                payloads.push(Err(UnreadablePayload {
                    name: format!("<member #{}>", index),
                    error: Coco2CsvError::Archive { source },
                }));
                continue;
            }
        };

        let name = file.name().to_string();
        if file.is_dir() {
            continue;
        }
        if !members.is_empty() && !members.contains(&name) {
            debug!("skipping unrequested member '{}'", name);
            continue;
        }

        let mut bytes = Vec::new();
        match file.read_to_end(&mut bytes) {
            Ok(_) => payloads.push(Ok(Payload { name, bytes })),
            Err(e) => payloads.push(Err(UnreadablePayload {
                name,
                error: Coco2CsvError::Io(e),
            })),
        }
    }

    for wanted in members {
        let found = payloads.iter().any(|entry| match entry {
            Ok(payload) => &payload.name == wanted,
            Err(unreadable) => &unreadable.name == wanted,
        });
        if !found {
            warn!("requested member '{}' not found in '{}'", wanted, source_name);
        }
    }

    if payloads.is_empty() {
        return Err(Coco2CsvError::NoPayloads {
            source_name: source_name.to_string(),
        });
    }
    Ok(payloads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, contents) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(contents.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    fn raw(name: &str, bytes: Vec<u8>) -> RawSource {
        RawSource {
            name: name.to_string(),
            bytes,
        }
    }

    fn names(payloads: &[Result<Payload, UnreadablePayload>]) -> Vec<String> {
        payloads
            .iter()
            .map(|entry| match entry {
                Ok(payload) => payload.name.clone(),
                Err(unreadable) => unreadable.name.clone(),
            })
            .collect()
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("http://localhost:8000/test.json"),
            Source::Url("http://localhost:8000/test.json".to_string())
        );
        assert_eq!(
            Source::parse("data/val.zip"),
            Source::Path(PathBuf::from("data/val.zip"))
        );
    }

    #[test]
    fn test_source_name() {
        assert_eq!(
            Source::parse("http://localhost:8000/test.json").name(),
            "test.json"
        );
        assert_eq!(
            Source::parse("https://host/a/annotations.zip?token=1").name(),
            "annotations.zip"
        );
        assert_eq!(Source::parse("https://host/").name(), "download.json");
        assert_eq!(Source::parse("/tmp/x/val.json").name(), "val.json");
    }

    #[test]
    fn test_raw_json_is_single_payload() {
        let payloads = split_payloads(raw("test.json", b"{}".to_vec()), &[]).unwrap();
        assert_eq!(payloads.len(), 1);
        let payload = payloads[0].as_ref().unwrap();
        assert_eq!(payload.name, "test.json");
        assert_eq!(payload.bytes, b"{}");
    }

    #[test]
    fn test_zip_members_in_archive_order() {
        let bytes = zip_bytes(&[
            ("annotations/", ""),
            ("annotations/instances_val.json", "{}"),
            ("annotations/person_keypoints_val.json", "[]"),
        ]);

        let payloads = split_payloads(raw("a.zip", bytes), &[]).unwrap();
        assert_eq!(
            names(&payloads),
            vec![
                "annotations/instances_val.json",
                "annotations/person_keypoints_val.json"
            ]
        );
    }

    #[test]
    fn test_member_filter() {
        let bytes = zip_bytes(&[("a.json", "{}"), ("b.json", "{}")]);
        let payloads = split_payloads(raw("a.zip", bytes), &["b.json".to_string()]).unwrap();
        assert_eq!(names(&payloads), vec!["b.json"]);
    }

    #[test]
    fn test_filter_matching_nothing_is_no_payloads() {
        let bytes = zip_bytes(&[("a.json", "{}")]);
        let err = split_payloads(raw("a.zip", bytes), &["zzz.json".to_string()]).unwrap_err();
        assert!(matches!(err, Coco2CsvError::NoPayloads { .. }));
    }

    #[test]
    fn test_corrupt_zip_falls_back_to_single_payload() {
        let mut bytes = b"PK\x03\x04".to_vec();
        bytes.extend_from_slice(&[0u8; 16]);
        let payloads = split_payloads(raw("bad.zip", bytes.clone()), &[]).unwrap();
        assert_eq!(names(&payloads), vec!["bad.zip"]);
        assert_eq!(payloads[0].as_ref().unwrap().bytes, bytes);
    }

    #[test]
    fn test_archive_after_leading_bytes_is_still_split() {
        let mut bytes = b"#!/bin/sh\nexec unzip \"$0\"\n".to_vec();
        bytes.extend(zip_bytes(&[("a.json", "{}")]));

        let payloads = split_payloads(raw("x.zip", bytes), &[]).unwrap();
        assert_eq!(names(&payloads), vec!["a.json"]);
        assert_eq!(payloads[0].as_ref().unwrap().bytes, b"{}");
    }

    #[test]
    fn test_member_filter_ignored_for_raw_json() {
        let payloads =
            split_payloads(raw("doc.json", b"{}".to_vec()), &["a.json".to_string()]).unwrap();
        assert_eq!(names(&payloads), vec!["doc.json"]);
    }

    #[test]
    fn test_payload_stem() {
        assert_eq!(
            Payload::new("annotations/instances_val2017.json", "").stem(),
            "instances_val2017"
        );
        assert_eq!(Payload::new("", "").stem(), "payload");
    }

    #[test]
    fn test_fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, b"{\"images\": []}").unwrap();

        let raw = Source::Path(path).fetch(Duration::from_secs(1)).unwrap();
        assert_eq!(raw.name, "doc.json");
        assert_eq!(raw.bytes, b"{\"images\": []}");
    }

    #[test]
    fn test_fetch_missing_file_is_io_error() {
        let err = Source::parse("does/not/exist.json")
            .fetch(Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, Coco2CsvError::Io(_)));
    }
}
