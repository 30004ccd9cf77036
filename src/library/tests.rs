use super::*;
use std::time::Duration;

fn t(title: &str, artist: &str, genre: &str) -> Track {
    Track {
        id: title.to_lowercase(),
        title: title.into(),
        artist: artist.into(),
        duration: Duration::from_secs(120),
        genre: genre.into(),
        favorite: false,
        source: format!("/music/{title}.mp3"),
        artwork: None,
        accent: None,
    }
}

fn catalog() -> Catalog {
    Catalog::new(vec![
        t("Blackened", "Metallica", "Metal"),
        t("Paranoid", "Black Sabbath", "Metal"),
        t("Señorita", "Shawn Mendes", "Pop"),
    ])
}

#[test]
fn get_reports_out_of_bounds_instead_of_a_placeholder() {
    let c = catalog();
    assert_eq!(c.get(2).unwrap().title, "Señorita");
    assert_eq!(
        c.get(3).unwrap_err(),
        CatalogError::OutOfBounds { index: 3, len: 3 }
    );
}

#[test]
fn toggle_favorite_flips_and_pairs_restore() {
    let mut c = catalog();
    assert_eq!(c.toggle_favorite(1), Ok(true));
    assert_eq!(c.favorites(), vec![1]);
    assert_eq!(c.toggle_favorite(1), Ok(false));
    assert!(c.favorites().is_empty());
    assert!(c.toggle_favorite(9).is_err());
}

#[test]
fn search_matches_title_artist_and_genre_case_insensitively() {
    let c = catalog();
    assert_eq!(c.search("black"), vec![0, 1]);
    assert_eq!(c.search("SEÑOR"), vec![2]);
    assert_eq!(c.search("pop"), vec![2]);
    assert!(c.search("   ").is_empty());
    assert!(c.search("jazz").is_empty());
}

#[test]
fn filter_genre_is_exact_not_substring() {
    let c = catalog();
    assert_eq!(c.filter_genre("metal"), vec![0, 1]);
    assert!(c.filter_genre("met").is_empty());
}

#[test]
fn apply_favorites_marks_known_ids_only() {
    let mut c = catalog();
    c.apply_favorites(&["paranoid".to_string(), "missing".to_string()]);
    assert_eq!(c.favorite_ids(), vec!["paranoid".to_string()]);
}

#[test]
fn track_json_uses_persisted_field_names() {
    let json = r##"{
        "id": "t9",
        "title": "Song",
        "artist": "Band",
        "duration": 95.6,
        "genre": "Rock",
        "favorite": true,
        "coverColor": "#fff",
        "src": "music/song.mp3"
    }"##;
    let track: Track = serde_json::from_str(json).unwrap();
    assert_eq!(track.source, "music/song.mp3");
    assert_eq!(track.accent.as_deref(), Some("#fff"));
    assert_eq!(track.duration.as_secs(), 95);
    assert!(track.artwork.is_none());

    let back = serde_json::to_value(&track).unwrap();
    assert_eq!(back["duration"], 95);
    assert_eq!(back["src"], "music/song.mp3");
    assert!(back.get("cover").is_none());
}

#[test]
fn negative_duration_in_saved_data_becomes_zero() {
    let json = r#"{"id":"x","title":"X","duration":-4}"#;
    let track: Track = serde_json::from_str(json).unwrap();
    assert_eq!(track.duration, Duration::ZERO);
}

#[test]
fn display_omits_blank_artist() {
    assert_eq!(t("Song", "Artist", "").display(), "Artist - Song");
    assert_eq!(t("Song", "  ", "").display(), "Song");
}

#[test]
fn default_catalog_is_not_empty_and_has_sources() {
    let tracks = default_tracks();
    assert!(!tracks.is_empty());
    assert!(tracks.iter().all(|t| !t.source.is_empty()));
}
