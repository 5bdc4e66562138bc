//! HTTP download for URL sources.

use std::time::Duration;

use log::debug;

use crate::error::Coco2CsvError;

// COCO annotation archives run to a few hundred megabytes.
const MAX_DOWNLOAD_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// Downloads `url` into memory.
///
/// Non-success status codes and transport failures are both reported as
/// [`Coco2CsvError::Fetch`].
pub fn download(url: &str, timeout: Duration) -> Result<Vec<u8>, Coco2CsvError> {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    let agent: ureq::Agent = config.into();

    debug!("GET {} (timeout {:?})", url, timeout);
    let mut response = agent.get(url).call().map_err(|source| Coco2CsvError::Fetch {
        url: url.to_string(),
        message: source.to_string(),
    })?;

    response
        .body_mut()
        .with_config()
        .limit(MAX_DOWNLOAD_BYTES)
        .read_to_vec()
        .map_err(|source| Coco2CsvError::Fetch {
            url: url.to_string(),
            message: source.to_string(),
        })
}
