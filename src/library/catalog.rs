use thiserror::Error;

use super::model::Track;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("track index {index} is out of range (catalog has {len} tracks)")]
    OutOfBounds { index: usize, len: usize },
}

/// Ordered, fixed list of library tracks.
///
/// Indices are stable for the lifetime of the catalog; the only mutation is the
/// per-track favorite flag.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Bounds-checked lookup.
    pub fn get(&self, index: usize) -> Result<&Track, CatalogError> {
        self.tracks.get(index).ok_or(CatalogError::OutOfBounds {
            index,
            len: self.tracks.len(),
        })
    }

    /// Flip the favorite flag of `index` and return the new value.
    pub fn toggle_favorite(&mut self, index: usize) -> Result<bool, CatalogError> {
        let len = self.tracks.len();
        let track = self
            .tracks
            .get_mut(index)
            .ok_or(CatalogError::OutOfBounds { index, len })?;
        track.favorite = !track.favorite;
        Ok(track.favorite)
    }

    /// Indices of favorite tracks, in catalog order.
    pub fn favorites(&self) -> Vec<usize> {
        self.indices_where(|t| t.favorite)
    }

    /// Ids of favorite tracks, in catalog order.
    pub fn favorite_ids(&self) -> Vec<String> {
        self.tracks
            .iter()
            .filter(|t| t.favorite)
            .map(|t| t.id.clone())
            .collect()
    }

    /// Mark every track whose id appears in `ids` as a favorite.
    pub fn apply_favorites(&mut self, ids: &[String]) {
        for track in &mut self.tracks {
            if ids.iter().any(|id| id == &track.id) {
                track.favorite = true;
            }
        }
    }

    /// Case-insensitive substring match on title, artist and genre.
    ///
    /// A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<usize> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.indices_where(|t| {
            t.title.to_lowercase().contains(&needle)
                || t.artist.to_lowercase().contains(&needle)
                || t.genre.to_lowercase().contains(&needle)
        })
    }

    /// Case-insensitive exact match on the genre label.
    pub fn filter_genre(&self, genre: &str) -> Vec<usize> {
        let wanted = genre.to_lowercase();
        self.indices_where(|t| t.genre.to_lowercase() == wanted)
    }

    fn indices_where(&self, pred: impl Fn(&Track) -> bool) -> Vec<usize> {
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| pred(t))
            .map(|(i, _)| i)
            .collect()
    }
}
