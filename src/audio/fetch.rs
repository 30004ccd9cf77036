//! Background download of remote sources.
//!
//! rodio decodes from a seekable reader, so remote previews are fetched into
//! memory on a worker thread and handed back over a channel.

use std::sync::mpsc::{self, Receiver};
use std::thread;

use reqwest::blocking::Client;

use super::types::MediaError;

pub(super) type FetchResult = Result<Vec<u8>, MediaError>;

pub(super) fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

/// Start downloading `url`. Dropping the receiver abandons the result.
pub(super) fn spawn_fetch(client: Client, url: String) -> Receiver<FetchResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = fetch(&client, &url);
        if let Err(e) = &result {
            log::error!("fetching {url} failed: {e}");
        }
        // The driver may have moved on to another source already.
        let _ = tx.send(result);
    });
    rx
}

fn fetch(client: &Client, url: &str) -> FetchResult {
    let response = client.get(url).send().map_err(transport_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(MediaError::Network(format!("HTTP {status}")));
    }
    let bytes = response.bytes().map_err(transport_error)?;
    log::debug!("fetched {} bytes from {url}", bytes.len());
    Ok(bytes.to_vec())
}

fn transport_error(e: reqwest::Error) -> MediaError {
    if e.is_timeout() {
        MediaError::Aborted
    } else {
        MediaError::Network(e.to_string())
    }
}
