use std::time::Duration;

use super::model::SearchResponse;
use super::*;
use crate::library::PREVIEW_CLIP;

fn preview(source: &str) -> PreviewTrack {
    PreviewTrack {
        id: "api_1".into(),
        title: "Song".into(),
        artist: "Band".into(),
        album: "Album".into(),
        genre: "Rock".into(),
        duration: PREVIEW_CLIP,
        full_length: None,
        source: source.into(),
        artwork: None,
        accent: None,
    }
}

struct Fixed(Vec<PreviewTrack>);

impl SearchProvider for Fixed {
    fn search_songs(&self, _query: &str, limit: usize) -> Result<Vec<PreviewTrack>, SearchError> {
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

struct Down;

impl SearchProvider for Down {
    fn search_songs(&self, _query: &str, _limit: usize) -> Result<Vec<PreviewTrack>, SearchError> {
        Err(SearchError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
    }
}

#[test]
fn valid_preview_requires_https_url_with_host() {
    assert!(is_valid_preview(&preview(
        "https://audio-ssl.itunes.apple.com/p/a.m4a"
    )));
    assert!(!is_valid_preview(&preview("http://example.com/a.m4a")));
    assert!(!is_valid_preview(&preview("https//broken")));
    assert!(!is_valid_preview(&preview("")));
    assert!(!is_valid_preview(&preview("music/local.mp3")));
}

#[test]
fn lookup_drops_results_without_playable_source() {
    let provider = Fixed(vec![
        preview("https://cdn.example/a.m4a"),
        preview(""),
        preview("http://cdn.example/b.m4a"),
    ]);
    let found = lookup(&provider, "song", 10);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].source, "https://cdn.example/a.m4a");
}

#[test]
fn lookup_degrades_to_empty_on_failure_or_blank_query() {
    assert!(lookup(&Down, "anything", 10).is_empty());
    let provider = Fixed(vec![preview("https://cdn.example/a.m4a")]);
    assert!(lookup(&provider, "   ", 10).is_empty());
}

#[test]
fn itunes_results_map_onto_previews() {
    let json = r#"{
        "resultCount": 2,
        "results": [
            {
                "trackId": 42,
                "trackName": "Heroes",
                "artistName": "David Bowie",
                "collectionName": "Heroes",
                "trackTimeMillis": 371000,
                "primaryGenreName": "Rock",
                "previewUrl": "https://audio.example/heroes.m4a",
                "artworkUrl60": "https://img.example/60.jpg",
                "artworkUrl100": "https://img.example/100.jpg"
            },
            { "artworkUrl60": "https://img.example/only60.jpg" }
        ]
    }"#;
    let body: SearchResponse = serde_json::from_str(json).unwrap();
    let mut previews: Vec<PreviewTrack> = body
        .results
        .into_iter()
        .enumerate()
        .map(|(i, item)| item.into_preview(i))
        .collect();

    let sparse = previews.pop().unwrap();
    let full = previews.pop().unwrap();

    assert_eq!(full.id, "api_42");
    assert_eq!(full.title, "Heroes");
    assert_eq!(full.artist, "David Bowie");
    assert_eq!(full.genre, "Rock");
    assert_eq!(full.duration, PREVIEW_CLIP);
    assert_eq!(full.full_length, Some(Duration::from_secs(371)));
    assert_eq!(full.artwork.as_deref(), Some("https://img.example/100.jpg"));
    assert!(full.accent.as_deref().is_some_and(|c| c.starts_with('#')));
    assert!(is_valid_preview(&full));

    assert_eq!(sparse.id, "api_1");
    assert_eq!(sparse.title, "Unknown Title");
    assert_eq!(sparse.artist, "Unknown Artist");
    assert_eq!(sparse.album, "Unknown Album");
    assert_eq!(sparse.genre, "Other");
    assert_eq!(sparse.full_length, None);
    assert_eq!(sparse.artwork.as_deref(), Some("https://img.example/only60.jpg"));
    assert!(!is_valid_preview(&sparse));
}

#[test]
fn missing_results_field_is_an_empty_answer() {
    let body: SearchResponse = serde_json::from_str(r#"{"resultCount":0}"#).unwrap();
    assert!(body.results.is_empty());
}
