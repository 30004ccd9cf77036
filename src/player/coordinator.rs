use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::audio::{MediaDriver, MediaEvent};
use crate::config::Settings;
use crate::library::{Catalog, PreviewTrack};
use crate::search::SearchProvider;
use crate::storage::CatalogStore;

use super::history::History;
use super::poll::{EndPolicy, TimerHandle, Timers};
use super::queue::PlayQueue;
use super::remote::RemoteSearch;
use super::sink::PresentationSink;
use super::types::{
    Advance, ListItem, Loaded, Page, PlayerError, QueueEntry, SearchStatus, TrackListTarget,
};

/// Tunables for a coordinator, usually taken from `Settings`.
#[derive(Debug, Clone)]
pub struct Options {
    pub poll_interval: Duration,
    /// `play_previous` restarts the current track past this point.
    pub restart_threshold: Duration,
    pub history_limit: usize,
    pub preview_settle: Duration,
    pub preview_end_margin: Duration,
    pub next_up_count: usize,
    pub search_limit: usize,
    pub volume: f32,
}

impl Default for Options {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl Options {
    pub fn from_settings(settings: &Settings) -> Self {
        let playback = &settings.playback;
        Self {
            poll_interval: playback.poll_interval(),
            restart_threshold: playback.restart_threshold(),
            history_limit: playback.history_limit,
            preview_settle: playback.preview_settle(),
            preview_end_margin: playback.preview_end_margin(),
            next_up_count: settings.ui.next_up_count,
            search_limit: settings.search.limit,
            volume: settings.audio.volume,
        }
    }
}

/// Owns the session and sequences playback.
///
/// Every operation runs to completion on the caller's thread. Time only moves
/// when the host calls [`Coordinator::tick`].
pub struct Coordinator<D: MediaDriver, S: PresentationSink> {
    driver: D,
    sink: S,
    catalog: Catalog,
    options: Options,
    loaded: Loaded,
    /// Source the driver currently holds; `None` forces a load on next play.
    loaded_source: Option<String>,
    playing: bool,
    shuffle: bool,
    repeat: bool,
    queue_view: bool,
    current_time: Duration,
    volume: f32,
    queue: PlayQueue,
    history: History,
    timers: Timers,
    remote: Option<RemoteSearch>,
    last_query: Option<String>,
    last_remote: Vec<PreviewTrack>,
    store: Option<Box<dyn CatalogStore>>,
}

impl<D: MediaDriver, S: PresentationSink> Coordinator<D, S> {
    pub fn new(driver: D, sink: S, catalog: Catalog, options: Options) -> Self {
        let history = History::new(options.history_limit.max(1));
        let volume = options.volume;
        Self {
            driver,
            sink,
            catalog,
            options,
            loaded: Loaded::Idle,
            loaded_source: None,
            playing: false,
            shuffle: false,
            repeat: false,
            queue_view: false,
            current_time: Duration::ZERO,
            volume,
            queue: PlayQueue::default(),
            history,
            timers: Timers::default(),
            remote: None,
            last_query: None,
            last_remote: Vec::new(),
            store: None,
        }
    }

    /// Enable remote preview lookups for `search`.
    pub fn with_search(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.remote = Some(RemoteSearch::new(provider, self.options.search_limit));
        self
    }

    /// Persist the catalog here after favorite changes.
    pub fn with_store(mut self, store: Box<dyn CatalogStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Push the initial state to the driver and the sink.
    pub fn init(&mut self) {
        self.driver.set_volume(self.volume);
        self.update_player_display();
        self.render_history();
        self.render_favorites();
        self.refresh_library();
        self.sink.update_play_icons(self.playing);
        self.push_controls();
        self.sink.update_search_status(SearchStatus::Idle);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn loaded(&self) -> &Loaded {
        &self.loaded
    }

    /// Index of the loaded catalog track, if one is loaded.
    pub fn current_index(&self) -> Option<usize> {
        match self.loaded {
            Loaded::Catalog(i) => Some(i),
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn queue_view(&self) -> bool {
        self.queue_view
    }

    pub fn current_time(&self) -> Duration {
        self.current_time
    }

    pub fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn poll_handle(&self) -> Option<TimerHandle> {
        self.timers.poll_handle()
    }

    pub fn poll_policy(&self) -> Option<EndPolicy> {
        self.timers.poll_policy()
    }

    pub fn settle_pending(&self) -> bool {
        self.timers.settle_pending()
    }

    // ----- transport -----

    pub fn toggle_play_pause(&mut self) {
        if self.loaded == Loaded::Idle {
            if self.catalog.is_empty() {
                log::warn!("play requested with an empty catalog");
                return;
            }
            self.loaded = Loaded::Catalog(0);
            self.current_time = Duration::ZERO;
            self.loaded_source = None;
            self.update_player_display();
        }

        self.playing = !self.playing;
        self.sink.update_play_icons(self.playing);

        if !self.playing {
            self.stop_playback();
            return;
        }
        match self.loaded {
            Loaded::Preview(_) => self.resume_preview(),
            _ => self.start_playback(),
        }
    }

    /// Play catalog track `index`, replacing whatever is loaded.
    pub fn play_track(&mut self, index: usize) -> Result<(), PlayerError> {
        let track = self.catalog.get(index).inspect_err(|e| log::warn!("{e}"))?;
        if track.source.trim().is_empty() {
            log::warn!("track has no audio source: {}", track.title);
            return Err(PlayerError::MissingSource(track.title.clone()));
        }
        log::info!("playing {}", track.display());

        self.loaded = Loaded::Catalog(index);
        self.current_time = Duration::ZERO;
        self.loaded_source = None;
        self.update_player_display();

        if self.playing {
            self.start_playback();
        } else {
            self.toggle_play_pause();
        }
        Ok(())
    }

    /// Load a foreign preview and start it once the settle delay passes.
    pub fn play_foreign_preview(&mut self, track: PreviewTrack) -> Result<(), PlayerError> {
        if track.source.trim().is_empty() {
            log::warn!("preview has no audio source: {}", track.title);
            return Err(PlayerError::MissingSource(track.title));
        }
        log::info!("previewing {}", track.display());

        self.stop_playback();
        self.playing = false;
        self.sink.update_play_icons(false);
        self.current_time = Duration::ZERO;

        let item = ListItem::Preview(track.clone());
        self.sink.update_player_info(Some(&item), false, true);
        self.sink.update_time_display(Duration::ZERO, track.duration);

        self.driver.load(&track.source);
        self.loaded_source = Some(track.source.clone());
        self.loaded = Loaded::Preview(track);
        self.render_sidebar();
        self.timers.schedule_settle(self.options.preview_settle);
        Ok(())
    }

    fn play_entry(&mut self, entry: QueueEntry) -> Result<(), PlayerError> {
        match entry {
            QueueEntry::Catalog(index) => self.play_track(index),
            QueueEntry::Preview(track) => self.play_foreign_preview(track),
        }
    }

    /// Advance: queue head first, then shuffle or sequential order.
    pub fn play_next(&mut self, advance: Advance) {
        if let Some(entry) = self.queue.pop() {
            log::debug!("{advance:?} advance from queue ({} left)", self.queue.len());
            if let Err(e) = self.play_entry(entry) {
                self.sink.show_message(&e.to_string());
            }
            self.render_sidebar();
            return;
        }

        let len = self.catalog.len();
        if len == 0 {
            return;
        }
        let current = self.current_index();
        let next = if self.shuffle {
            self.random_other(current)
        } else {
            current.map_or(0, |i| (i + 1) % len)
        };
        log::debug!("{advance:?} advance to {next}");
        self.cue(next);
    }

    /// Restart the track when past the threshold, else step back.
    pub fn play_previous(&mut self) {
        if self.current_time > self.options.restart_threshold {
            self.seek(0.0);
            return;
        }

        let len = self.catalog.len();
        if len == 0 {
            return;
        }
        let current = self.current_index();
        let previous = if self.shuffle {
            self.random_other(current)
        } else {
            current.map_or(len - 1, |i| (i + len - 1) % len)
        };
        self.cue(previous);
    }

    /// Natural end of the loaded track.
    pub fn on_track_end(&mut self) {
        if let Loaded::Preview(_) = self.loaded {
            self.finish_preview();
            return;
        }
        if self.repeat && self.current_index().is_some() {
            log::debug!("repeat: replaying current track");
            self.current_time = Duration::ZERO;
            self.loaded_source = None;
            let duration = self.active_duration().unwrap_or_default();
            self.sink.update_time_display(Duration::ZERO, duration);
            self.start_playback();
            return;
        }
        self.play_next(Advance::Auto);
    }

    /// Jump to `percent` of the known duration, clamped to `[0, 1]`.
    pub fn seek(&mut self, percent: f64) {
        if percent.is_nan() {
            log::warn!("ignoring seek to NaN");
            return;
        }
        let percent = percent.clamp(0.0, 1.0);
        let Some(duration) = self.driver.duration().filter(|d| !d.is_zero()) else {
            log::debug!("seek ignored, duration unknown");
            return;
        };
        let target = duration.mul_f64(percent).min(duration);
        self.driver.seek_to(target);
        self.current_time = target;
        self.sink.update_time_display(target, duration);
    }

    /// Scrub relative to the current position.
    pub fn seek_by(&mut self, delta_secs: i64) {
        let Some(duration) = self.driver.duration().filter(|d| !d.is_zero()) else {
            return;
        };
        let target = self.current_time.as_secs_f64() + delta_secs as f64;
        self.seek(target / duration.as_secs_f64());
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.driver.set_volume(self.volume);
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        self.set_volume(self.volume + delta);
    }

    /// Stop everything before the process exits.
    pub fn shutdown(&mut self) {
        self.timers.cancel_all();
        if let Some(remote) = self.remote.as_mut() {
            remote.cancel();
        }
        self.driver.stop();
        self.playing = false;
        self.sink.update_play_icons(false);
    }

    // ----- queue and modes -----

    /// Append to the manual queue and return its new length.
    pub fn add_to_queue(&mut self, entry: QueueEntry) -> Result<usize, PlayerError> {
        match &entry {
            QueueEntry::Catalog(index) => {
                let track = self.catalog.get(*index).inspect_err(|e| log::warn!("{e}"))?;
                log::info!("queued {}", track.display());
            }
            QueueEntry::Preview(track) => log::info!("queued preview {}", track.display()),
        }
        self.queue.push(entry);
        let len = self.queue.len();
        if self.queue_view {
            self.render_sidebar();
        }
        self.sink
            .show_message(&format!("Added to queue ({len} in queue)"));
        Ok(len)
    }

    pub fn toggle_queue_view(&mut self) {
        self.queue_view = !self.queue_view;
        self.push_controls();
        self.render_sidebar();
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
        if self.shuffle {
            self.repeat = false;
        }
        self.push_controls();
        self.render_sidebar();
    }

    pub fn toggle_repeat(&mut self) {
        self.repeat = !self.repeat;
        if self.repeat {
            self.shuffle = false;
        }
        self.push_controls();
        self.render_sidebar();
    }

    /// Flip the favorite flag of `index`, or of the loaded catalog track when
    /// `None`. Returns the new flag, or `None` when there was nothing to toggle.
    pub fn toggle_favorite(&mut self, index: Option<usize>) -> Result<Option<bool>, PlayerError> {
        let Some(index) = index.or(self.current_index()) else {
            log::debug!("no catalog track to favorite");
            return Ok(None);
        };
        let favorite = self
            .catalog
            .toggle_favorite(index)
            .inspect_err(|e| log::warn!("{e}"))?;

        if self.current_index() == Some(index) {
            self.update_player_display();
        }
        self.render_favorites();
        self.render_history();
        self.rerender_search();
        self.persist();
        Ok(Some(favorite))
    }

    // ----- lists -----

    /// Local matches right away; remote previews follow on a later tick.
    pub fn search(&mut self, query: &str) {
        let query = query.trim();
        if let Some(remote) = self.remote.as_mut() {
            remote.cancel();
        }
        self.last_remote.clear();

        if query.is_empty() {
            self.last_query = None;
            self.sink.render_track_list(&[], TrackListTarget::SearchResults);
            self.sink.update_search_status(SearchStatus::Idle);
            return;
        }

        self.last_query = Some(query.to_string());
        let local = self.catalog_items(&self.catalog.search(query));
        self.sink
            .render_track_list(&local, TrackListTarget::SearchResults);

        match self.remote.as_mut() {
            Some(remote) => {
                remote.start(query);
                self.sink.update_search_status(SearchStatus::Searching);
            }
            None => self
                .sink
                .update_search_status(SearchStatus::Found(local.len())),
        }
    }

    /// Block until the pending remote search finishes or `timeout` passes.
    /// Returns whether results were applied.
    pub fn await_search(&mut self, timeout: Duration) -> bool {
        let Some(finished) = self.remote.as_mut().and_then(|r| r.wait(timeout)) else {
            return false;
        };
        self.apply_remote(finished);
        true
    }

    pub fn search_pending(&self) -> bool {
        self.remote.as_ref().is_some_and(RemoteSearch::is_pending)
    }

    pub fn filter_genre(&mut self, genre: &str) {
        self.sink.show_page(Page::Search);
        self.sink
            .update_search_status(SearchStatus::Genre(genre.to_string()));
        let items = self.catalog_items(&self.catalog.filter_genre(genre));
        self.sink
            .render_track_list(&items, TrackListTarget::SearchResults);
    }

    pub fn refresh_library(&mut self) {
        let all: Vec<usize> = (0..self.catalog.len()).collect();
        let items = self.catalog_items(&all);
        self.sink.render_track_list(&items, TrackListTarget::Library);
    }

    // ----- time -----

    /// Advance the session to `now`: driver events, preview start, one poll
    /// iteration and finished remote searches.
    pub fn tick(&mut self, now: Instant) {
        for event in self.driver.poll_events() {
            self.on_media_event(event);
        }

        if self.timers.settle_due(now).is_some() {
            self.begin_preview();
        }

        if let Some((handle, policy)) = self.timers.poll_due(now) {
            log::trace!("poll {handle:?}");
            self.poll_once(policy);
        }

        if let Some(finished) = self.remote.as_mut().and_then(RemoteSearch::try_finish) {
            self.apply_remote(finished);
        }
    }

    fn on_media_event(&mut self, event: MediaEvent) {
        match event {
            // Progress comes from the poll loop alone.
            MediaEvent::TimeUpdate(_) => {}
            MediaEvent::Ended => {
                // The poll detects the end whenever the duration is known.
                if self.current_index().is_some() && self.driver.duration().is_none() {
                    self.on_track_end();
                }
            }
            MediaEvent::Error(e) => {
                log::error!("playback failed: {e}");
                self.sink.show_message(&e.to_string());
                self.timers.cancel_all();
                self.playing = false;
                self.loaded_source = None;
                self.sink.update_play_icons(false);
            }
        }
    }

    fn poll_once(&mut self, policy: EndPolicy) {
        let Some(duration) = self.active_duration() else {
            return;
        };
        let position = self.driver.current_time().min(duration);
        self.current_time = position;
        self.sink.update_time_display(position, duration);

        match policy {
            // Catalog tracks end only against the driver's reported length.
            EndPolicy::ReachedDuration
                if self.driver.duration().is_some_and(|length| position >= length) =>
            {
                self.on_track_end()
            }
            EndPolicy::PreviewMargin(margin) if position + margin >= duration => {
                self.finish_preview()
            }
            _ => {}
        }
    }

    // ----- internals -----

    fn start_playback(&mut self) {
        self.timers.cancel_all();
        let Some(index) = self.current_index() else {
            return;
        };
        let source = match self.catalog.get(index) {
            Ok(track) if !track.source.trim().is_empty() => track.source.clone(),
            Ok(track) => {
                let err = PlayerError::MissingSource(track.title.clone());
                self.abort_playback(&err.to_string());
                return;
            }
            Err(e) => {
                self.abort_playback(&e.to_string());
                return;
            }
        };

        self.ensure_loaded(&source);
        self.driver.play();
        self.timers
            .start_poll(EndPolicy::ReachedDuration, self.options.poll_interval);
        self.history.push(index);
        self.render_history();
    }

    fn stop_playback(&mut self) {
        self.driver.pause();
        self.timers.cancel_all();
    }

    fn abort_playback(&mut self, message: &str) {
        log::error!("{message}");
        self.sink.show_message(message);
        self.timers.cancel_all();
        self.playing = false;
        self.sink.update_play_icons(false);
    }

    fn ensure_loaded(&mut self, source: &str) {
        if self.loaded_source.as_deref() == Some(source) {
            return;
        }
        self.driver.load(source);
        self.loaded_source = Some(source.to_string());
    }

    fn resume_preview(&mut self) {
        self.timers.cancel_all();
        let Loaded::Preview(track) = &self.loaded else {
            return;
        };
        let source = track.source.clone();
        self.ensure_loaded(&source);
        self.driver.play();
        self.start_preview_poll();
    }

    /// Settle delay elapsed: start the loaded preview.
    fn begin_preview(&mut self) {
        if !matches!(self.loaded, Loaded::Preview(_)) {
            return;
        }
        self.playing = true;
        self.sink.update_play_icons(true);
        self.driver.play();
        self.start_preview_poll();
    }

    fn start_preview_poll(&mut self) {
        self.timers.start_poll(
            EndPolicy::PreviewMargin(self.options.preview_end_margin),
            self.options.poll_interval,
        );
    }

    fn finish_preview(&mut self) {
        log::info!("preview finished");
        self.stop_playback();
        self.playing = false;
        self.loaded_source = None;
        self.sink.update_play_icons(false);
    }

    /// Point at catalog track `index` without touching the queue.
    fn cue(&mut self, index: usize) {
        self.loaded = Loaded::Catalog(index);
        self.current_time = Duration::ZERO;
        self.loaded_source = None;
        self.update_player_display();
        if self.playing {
            self.start_playback();
        } else {
            self.timers.cancel_all();
        }
    }

    /// Uniform pick that differs from `current` whenever there is a choice.
    fn random_other(&self, current: Option<usize>) -> usize {
        let len = self.catalog.len();
        let mut rng = rand::rng();
        match current {
            _ if len <= 1 => 0,
            Some(cur) if cur < len => {
                let pick = rng.random_range(0..len - 1);
                if pick >= cur { pick + 1 } else { pick }
            }
            _ => rng.random_range(0..len),
        }
    }

    /// Duration of the loaded track: the driver's once it has the source,
    /// otherwise the track metadata.
    fn active_duration(&self) -> Option<Duration> {
        let metadata = match &self.loaded {
            Loaded::Idle => None,
            Loaded::Catalog(i) => self.catalog.get(*i).ok().map(|t| t.duration),
            Loaded::Preview(p) => Some(p.duration),
        };
        let reported = self
            .loaded_source
            .as_ref()
            .and_then(|_| self.driver.duration());
        reported.or(metadata).filter(|d| !d.is_zero())
    }

    fn loaded_item(&self) -> Option<ListItem> {
        match &self.loaded {
            Loaded::Idle => None,
            Loaded::Catalog(i) => self.catalog.get(*i).ok().map(|track| ListItem::Catalog {
                index: *i,
                track: track.clone(),
            }),
            Loaded::Preview(p) => Some(ListItem::Preview(p.clone())),
        }
    }

    fn update_player_display(&mut self) {
        let item = self.loaded_item();
        let favorite = item.as_ref().is_some_and(ListItem::is_favorite);
        let preview = item.as_ref().is_some_and(ListItem::is_preview);
        self.sink.update_player_info(item.as_ref(), favorite, preview);
        let duration = self.active_duration().unwrap_or_default();
        self.sink.update_time_display(self.current_time, duration);
        self.render_sidebar();
    }

    fn push_controls(&mut self) {
        self.sink
            .update_controls_state(self.shuffle, self.repeat, self.queue_view);
    }

    fn catalog_items(&self, indices: &[usize]) -> Vec<ListItem> {
        indices
            .iter()
            .filter_map(|&index| {
                self.catalog.get(index).ok().map(|track| ListItem::Catalog {
                    index,
                    track: track.clone(),
                })
            })
            .collect()
    }

    fn render_history(&mut self) {
        let indices: Vec<usize> = self.history.iter().collect();
        let items = self.catalog_items(&indices);
        self.sink.render_recent_history(&items);
    }

    fn render_favorites(&mut self) {
        let items = self.catalog_items(&self.catalog.favorites());
        self.sink
            .render_track_list(&items, TrackListTarget::Favorites);
    }

    /// Queue contents, or the catalog tracks that follow the current one.
    fn render_sidebar(&mut self) {
        if self.queue_view {
            let items: Vec<ListItem> = self
                .queue
                .iter()
                .filter_map(|entry| match entry {
                    QueueEntry::Catalog(i) => {
                        self.catalog.get(*i).ok().map(|track| ListItem::Catalog {
                            index: *i,
                            track: track.clone(),
                        })
                    }
                    QueueEntry::Preview(p) => Some(ListItem::Preview(p.clone())),
                })
                .collect();
            self.sink.render_queue_or_picks(&items, "Queue");
            return;
        }

        let len = self.catalog.len();
        let upcoming: Vec<usize> = match self.current_index() {
            Some(cur) if len > 1 => {
                let count = self.options.next_up_count.min(len - 1);
                (1..=count).map(|step| (cur + step) % len).collect()
            }
            _ => Vec::new(),
        };
        let items = self.catalog_items(&upcoming);
        self.sink.render_queue_or_picks(&items, "Next Up");
    }

    fn apply_remote(&mut self, (query, previews): (String, Vec<PreviewTrack>)) {
        if self.last_query.as_deref() != Some(query.as_str()) {
            log::debug!("dropping results for stale query {query:?}");
            return;
        }
        self.last_remote = previews;
        self.rerender_search();
    }

    /// Re-render the last search with fresh favorite flags.
    fn rerender_search(&mut self) {
        let Some(query) = self.last_query.as_deref() else {
            return;
        };
        let mut items = self.catalog_items(&self.catalog.search(query));
        items.extend(self.last_remote.iter().cloned().map(ListItem::Preview));
        self.sink
            .render_track_list(&items, TrackListTarget::SearchResults);
        if !self.search_pending() {
            self.sink
                .update_search_status(SearchStatus::Found(items.len()));
        }
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(&self.catalog) {
            log::error!("saving library failed: {e}");
        }
    }
}
