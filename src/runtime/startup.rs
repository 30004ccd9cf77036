use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::audio::MediaDriver;
use crate::config;
use crate::library::{Catalog, default_tracks, scan};
use crate::player::{Coordinator, PresentationSink};
use crate::search::{ItunesClient, SearchProvider};
use crate::storage::JsonStore;

/// Build the catalog: a scanned directory when one is given, otherwise the
/// saved library, otherwise the built-in tracks.
pub fn load_catalog(
    dir: Option<&Path>,
    settings: &config::Settings,
    store: Option<&JsonStore>,
) -> Catalog {
    if let Some(dir) = dir {
        let tracks = scan(dir, &settings.library);
        if !tracks.is_empty() {
            let mut catalog = Catalog::new(tracks);
            if let Some(store) = store {
                catalog.apply_favorites(&store.load_favorite_ids());
            }
            return catalog;
        }
        log::warn!("no audio files under {}, using saved library", dir.display());
    }

    match store {
        Some(store) => store.load_catalog(),
        None => Catalog::new(default_tracks()),
    }
}

/// The remote preview search, unless disabled or its client cannot be built.
pub fn search_provider(settings: &config::SearchSettings) -> Option<Arc<dyn SearchProvider>> {
    if !settings.enabled {
        log::info!("remote search disabled");
        return None;
    }
    match ItunesClient::new(
        settings.endpoint.clone(),
        Duration::from_millis(settings.timeout_ms),
    ) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            log::error!("remote search unavailable: {e}");
            None
        }
    }
}

/// Apply the configured start modes. Shuffle wins when both are set.
pub fn apply_playback_defaults<D: MediaDriver, S: PresentationSink>(
    coordinator: &mut Coordinator<D, S>,
    settings: &config::Settings,
) {
    if settings.playback.shuffle {
        coordinator.toggle_shuffle();
    } else if settings.playback.repeat {
        coordinator.toggle_repeat();
    }
}
