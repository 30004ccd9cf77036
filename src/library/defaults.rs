use std::time::Duration;

use super::model::Track;

/// The catalog used when no directory is given and no saved state can be read.
///
/// Sources are relative to the working directory.
pub fn default_tracks() -> Vec<Track> {
    vec![
        Track {
            id: "t1".to_string(),
            title: "Astronaut In The Ocean".to_string(),
            artist: "Masked Wolf".to_string(),
            duration: Duration::from_secs(210),
            genre: "Hip Hop".to_string(),
            favorite: false,
            source: "music/Masked Wolf - Astronaut In The Ocean.mp3".to_string(),
            artwork: None,
            accent: Some("#1a1a1a".to_string()),
        },
        Track {
            id: "t2".to_string(),
            title: "Señorita".to_string(),
            artist: "Shawn Mendes, Camila Cabello".to_string(),
            duration: Duration::from_secs(191),
            genre: "Pop".to_string(),
            favorite: true,
            source: "music/Shawn Mendes, Camila Cabello - Señorita.mp3".to_string(),
            artwork: None,
            accent: Some("#d63031".to_string()),
        },
    ]
}
