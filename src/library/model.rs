use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Playable length of a foreign preview clip.
pub const PREVIEW_CLIP: Duration = Duration::from_secs(30);

/// A catalog entry.
///
/// Field names follow the persisted JSON document (`src`, `cover`, `coverColor`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, with = "seconds")]
    pub duration: Duration,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub favorite: bool,
    /// Local path or remote URL handed to the media driver.
    #[serde(default, rename = "src")]
    pub source: String,
    #[serde(default, rename = "cover", skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
    #[serde(default, rename = "coverColor", skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
}

impl Track {
    /// `Artist - Title`, or just the title when the artist is blank.
    pub fn display(&self) -> String {
        make_display(&self.title, &self.artist)
    }
}

/// A transient track found through the external search. Never part of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    /// Length of the playable clip, not of the full song.
    pub duration: Duration,
    pub full_length: Option<Duration>,
    pub source: String,
    pub artwork: Option<String>,
    pub accent: Option<String>,
}

impl PreviewTrack {
    pub fn display(&self) -> String {
        make_display(&self.title, &self.artist)
    }
}

pub(crate) fn make_display(title: &str, artist: &str) -> String {
    let artist = artist.trim();
    if artist.is_empty() {
        title.to_string()
    } else {
        format!("{artist} - {title}")
    }
}

/// Durations are stored as whole seconds; fractional or negative input is tolerated.
mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO))
    }
}
