use std::time::Duration;

use reqwest::blocking::Client;

use crate::library::PreviewTrack;

use super::model::SearchResponse;
use super::{SearchError, SearchProvider};

/// Blocking client for the iTunes search endpoint.
///
/// Calls block the calling thread; the coordinator runs them on a worker.
pub struct ItunesClient {
    http: Client,
    endpoint: String,
}

impl ItunesClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

impl SearchProvider for ItunesClient {
    fn search_songs(&self, query: &str, limit: usize) -> Result<Vec<PreviewTrack>, SearchError> {
        let limit = limit.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("term", query),
                ("media", "music"),
                ("entity", "song"),
                ("limit", limit.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        let body: SearchResponse = response.json()?;
        Ok(body
            .results
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.into_preview(i))
            .collect())
    }
}
