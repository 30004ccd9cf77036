//! Saved library state.
//!
//! One JSON document holding the catalog and the ids of favorite tracks:
//! `{ "playlist": [...], "favorites": [...] }`. Reading never fails the
//! caller; anything missing or unreadable falls back to the defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::library::{Catalog, Track, default_tracks};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed saved state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the coordinator writes the catalog after favorite changes.
pub trait CatalogStore {
    fn save(&self, catalog: &Catalog) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SavedState {
    #[serde(default, alias = "tracks")]
    playlist: Vec<Track>,
    #[serde(default)]
    favorites: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<SavedState>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Saved catalog with favorites applied, or the built-in default catalog.
    pub fn load_catalog(&self) -> Catalog {
        match self.read() {
            Ok(Some(state)) if !state.playlist.is_empty() => {
                log::info!(
                    "loaded {} tracks from {}",
                    state.playlist.len(),
                    self.path.display()
                );
                let mut catalog = Catalog::new(state.playlist);
                catalog.apply_favorites(&state.favorites);
                catalog
            }
            Ok(_) => {
                log::info!("no saved library at {}, using defaults", self.path.display());
                Catalog::new(default_tracks())
            }
            Err(e) => {
                log::error!("load error, using defaults: {e}");
                Catalog::new(default_tracks())
            }
        }
    }

    /// Saved favorite ids, used to re-mark a freshly scanned catalog.
    pub fn load_favorite_ids(&self) -> Vec<String> {
        match self.read() {
            Ok(Some(state)) => {
                let mut ids = state.favorites;
                ids.extend(
                    state
                        .playlist
                        .into_iter()
                        .filter(|t| t.favorite)
                        .map(|t| t.id),
                );
                ids.sort();
                ids.dedup();
                ids
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                log::error!("load error, no saved favorites: {e}");
                Vec::new()
            }
        }
    }
}

impl CatalogStore for JsonStore {
    fn save(&self, catalog: &Catalog) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        let state = SavedState {
            playlist: catalog.tracks().to_vec(),
            favorites: catalog.favorite_ids(),
        };
        let json = serde_json::to_string_pretty(&state)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        fs::write(&self.path, json).map_err(io_err)?;
        log::debug!("saved library to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nope.json"));
        let catalog = store.load_catalog();
        assert_eq!(catalog.len(), default_tracks().len());
        assert!(store.load_favorite_ids().is_empty());
    }

    #[test]
    fn corrupt_or_empty_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.json");

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(
            JsonStore::new(&path).load_catalog().tracks(),
            default_tracks().as_slice()
        );

        fs::write(&path, r#"{"playlist": [], "favorites": ["t1"]}"#).unwrap();
        assert_eq!(
            JsonStore::new(&path).load_catalog().tracks(),
            default_tracks().as_slice()
        );
    }

    #[test]
    fn save_then_load_keeps_favorites() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested").join("library.json"));

        let mut catalog = Catalog::new(default_tracks());
        let first = catalog.toggle_favorite(0).unwrap();
        store.save(&catalog).unwrap();

        let loaded = store.load_catalog();
        assert_eq!(loaded.get(0).unwrap().favorite, first);
        assert_eq!(loaded.favorite_ids(), catalog.favorite_ids());
    }

    #[test]
    fn favorites_list_marks_tracks_and_tracks_alias_is_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.json");
        fs::write(
            &path,
            r#"{
                "tracks": [
                    {"id": "a", "title": "A", "src": "a.mp3", "duration": 60},
                    {"id": "b", "title": "B", "src": "b.mp3", "duration": 61}
                ],
                "favorites": ["b"]
            }"#,
        )
        .unwrap();

        let store = JsonStore::new(&path);
        let catalog = store.load_catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.favorites(), vec![1]);
        assert_eq!(store.load_favorite_ids(), vec!["b".to_string()]);
    }
}
