//! iTunes search response shape and its conversion into previews.

use std::time::Duration;

use rand::seq::IndexedRandom;
use serde::Deserialize;

use crate::library::{PREVIEW_CLIP, PreviewTrack};

const ACCENTS: [&str; 12] = [
    "#667eea", "#764ba2", "#f093fb", "#4facfe", "#43e97b", "#fa709a", "#fee140", "#30b0fe",
    "#a8edea", "#fed6e3", "#ff9a9e", "#fecfef",
];

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct SearchItem {
    pub track_id: Option<u64>,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub collection_name: Option<String>,
    pub track_time_millis: Option<u64>,
    pub primary_genre_name: Option<String>,
    pub preview_url: Option<String>,
    pub artwork_url100: Option<String>,
    pub artwork_url60: Option<String>,
}

fn or_unknown(v: Option<String>, fallback: &str) -> String {
    v.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl SearchItem {
    /// `position` stands in for the id when the API omits `trackId`.
    pub fn into_preview(self, position: usize) -> PreviewTrack {
        let id = match self.track_id {
            Some(id) => format!("api_{id}"),
            None => format!("api_{position}"),
        };
        PreviewTrack {
            id,
            title: or_unknown(self.track_name, "Unknown Title"),
            artist: or_unknown(self.artist_name, "Unknown Artist"),
            album: or_unknown(self.collection_name, "Unknown Album"),
            genre: or_unknown(self.primary_genre_name, "Other"),
            duration: PREVIEW_CLIP,
            full_length: self
                .track_time_millis
                .filter(|&ms| ms > 0)
                .map(Duration::from_millis),
            source: self.preview_url.unwrap_or_default(),
            artwork: self
                .artwork_url100
                .or(self.artwork_url60)
                .filter(|u| !u.is_empty()),
            accent: ACCENTS
                .choose(&mut rand::rng())
                .map(|c| (*c).to_string()),
        }
    }
}
