//! Shared player types: what is loaded, queue entries and list items.

use std::time::Duration;

use thiserror::Error;

use crate::library::{CatalogError, PreviewTrack, Track};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("track has no audio source: {0}")]
    MissingSource(String),
}

/// What the media driver is currently pointed at.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Loaded {
    #[default]
    Idle,
    Catalog(usize),
    Preview(PreviewTrack),
}

/// One entry of the manual play queue.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEntry {
    Catalog(usize),
    Preview(PreviewTrack),
}

/// Why `play_next` was called.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The user asked for the next track.
    Manual,
    /// The current track ended.
    Auto,
}

/// A row handed to the presentation sink.
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    Catalog { index: usize, track: Track },
    Preview(PreviewTrack),
}

impl ListItem {
    pub fn title(&self) -> &str {
        match self {
            Self::Catalog { track, .. } => &track.title,
            Self::Preview(p) => &p.title,
        }
    }

    pub fn artist(&self) -> &str {
        match self {
            Self::Catalog { track, .. } => &track.artist,
            Self::Preview(p) => &p.artist,
        }
    }

    pub fn genre(&self) -> &str {
        match self {
            Self::Catalog { track, .. } => &track.genre,
            Self::Preview(p) => &p.genre,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Self::Catalog { track, .. } => track.duration,
            Self::Preview(p) => p.duration,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Catalog { track, .. } => track.display(),
            Self::Preview(p) => p.display(),
        }
    }

    pub fn is_favorite(&self) -> bool {
        matches!(self, Self::Catalog { track, .. } if track.favorite)
    }

    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview(_))
    }

    pub fn catalog_index(&self) -> Option<usize> {
        match self {
            Self::Catalog { index, .. } => Some(*index),
            Self::Preview(_) => None,
        }
    }

    pub fn accent(&self) -> Option<&str> {
        match self {
            Self::Catalog { track, .. } => track.accent.as_deref(),
            Self::Preview(p) => p.accent.as_deref(),
        }
    }

    pub fn to_queue_entry(&self) -> QueueEntry {
        match self {
            Self::Catalog { index, .. } => QueueEntry::Catalog(*index),
            Self::Preview(p) => QueueEntry::Preview(p.clone()),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Page {
    Home,
    Library,
    Favorites,
    Search,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrackListTarget {
    Library,
    Favorites,
    SearchResults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Searching,
    Found(usize),
    Genre(String),
}
