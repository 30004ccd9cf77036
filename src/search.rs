//! External search adapter: finds foreign previews on the iTunes search API.
//!
//! `SearchProvider` is the transport seam; `lookup` is what callers use, it
//! never fails and only returns previews with a playable source.

mod itunes;
mod model;

use thiserror::Error;
use url::Url;

use crate::library::PreviewTrack;

pub use itunes::ItunesClient;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search API answered {0}")]
    Status(reqwest::StatusCode),
}

/// A remote catalogue that can be queried for previews.
pub trait SearchProvider: Send + Sync {
    fn search_songs(&self, query: &str, limit: usize) -> Result<Vec<PreviewTrack>, SearchError>;
}

/// Query `provider`, logging and swallowing failures.
pub fn lookup(provider: &dyn SearchProvider, query: &str, limit: usize) -> Vec<PreviewTrack> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    match provider.search_songs(query, limit) {
        Ok(found) => {
            let total = found.len();
            let playable: Vec<PreviewTrack> =
                found.into_iter().filter(is_valid_preview).collect();
            log::debug!(
                "remote search {query:?}: {} playable of {total}",
                playable.len()
            );
            playable
        }
        Err(e) => {
            log::error!("remote search {query:?} failed: {e}");
            Vec::new()
        }
    }
}

/// True when the preview source is a well-formed `https` URL with a host.
pub fn is_valid_preview(track: &PreviewTrack) -> bool {
    Url::parse(&track.source)
        .map(|u| u.scheme() == "https" && u.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests;
