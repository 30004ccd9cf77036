//! Application model: `App`, the terminal view state.
//!
//! The coordinator pushes display updates into `App` through
//! `PresentationSink`; the runtime owns page navigation, selection and the
//! search prompt.

use std::time::{Duration, Instant};

use crate::player::{ListItem, Page, PresentationSink, SearchStatus, TrackListTarget};

const PAGES: [Page; 4] = [Page::Home, Page::Library, Page::Favorites, Page::Search];

fn page_slot(page: Page) -> usize {
    match page {
        Page::Home => 0,
        Page::Library => 1,
        Page::Favorites => 2,
        Page::Search => 3,
    }
}

/// The main application model.
pub struct App {
    pub page: Page,
    /// Selected row per page.
    selected: [usize; 4],

    pub now_playing: Option<ListItem>,
    pub now_favorite: bool,
    pub now_preview: bool,
    pub playing: bool,
    pub elapsed: Duration,
    pub total: Duration,

    pub shuffle: bool,
    pub repeat: bool,
    pub queue_view: bool,

    pub library: Vec<ListItem>,
    pub favorites: Vec<ListItem>,
    pub results: Vec<ListItem>,
    pub history: Vec<ListItem>,
    pub sidebar: Vec<ListItem>,
    pub sidebar_title: String,

    pub search_status: SearchStatus,
    pub search_mode: bool,
    pub search_query: String,
    pub metadata_window: bool,

    message: Option<(String, Instant)>,
    message_ttl: Duration,
}

impl App {
    /// Create an empty `App`; transient messages stay up for `message_ttl`.
    pub fn new(message_ttl: Duration) -> Self {
        Self {
            page: Page::Home,
            selected: [0; 4],
            now_playing: None,
            now_favorite: false,
            now_preview: false,
            playing: false,
            elapsed: Duration::ZERO,
            total: Duration::ZERO,
            shuffle: false,
            repeat: false,
            queue_view: false,
            library: Vec::new(),
            favorites: Vec::new(),
            results: Vec::new(),
            history: Vec::new(),
            sidebar: Vec::new(),
            sidebar_title: String::new(),
            search_status: SearchStatus::Idle,
            search_mode: false,
            search_query: String::new(),
            metadata_window: false,
            message: None,
            message_ttl,
        }
    }

    /// Rows of the list shown on the current page. Home shows recent history.
    pub fn visible_items(&self) -> &[ListItem] {
        match self.page {
            Page::Home => &self.history,
            Page::Library => &self.library,
            Page::Favorites => &self.favorites,
            Page::Search => &self.results,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected[page_slot(self.page)]
    }

    pub fn selected_item(&self) -> Option<&ListItem> {
        self.visible_items().get(self.selected())
    }

    fn set_selected(&mut self, idx: usize) {
        self.selected[page_slot(self.page)] = idx;
    }

    /// Move selection down, wrapping to the top.
    pub fn next(&mut self) {
        let len = self.visible_items().len();
        if len > 0 {
            self.set_selected((self.selected() + 1) % len);
        }
    }

    /// Move selection up, wrapping to the bottom.
    pub fn prev(&mut self) {
        let len = self.visible_items().len();
        if len > 0 {
            self.set_selected((self.selected() + len - 1) % len);
        }
    }

    pub fn top(&mut self) {
        self.set_selected(0);
    }

    pub fn bottom(&mut self) {
        let len = self.visible_items().len();
        self.set_selected(len.saturating_sub(1));
    }

    /// Advance to the next page tab.
    pub fn cycle_page(&mut self) {
        let next = (page_slot(self.page) + 1) % PAGES.len();
        self.page = PAGES[next];
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Open the search prompt on the Search page.
    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
        self.page = Page::Search;
    }

    pub fn exit_search_mode(&mut self) {
        self.search_mode = false;
    }

    /// Leave the prompt and drop the typed query.
    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.search_mode = false;
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search_query.push(c);
    }

    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
    }

    /// The transient message, if it has not expired at `now`.
    pub fn active_message(&self, now: Instant) -> Option<&str> {
        self.message
            .as_ref()
            .filter(|(_, posted)| now.saturating_duration_since(*posted) < self.message_ttl)
            .map(|(text, _)| text.as_str())
    }

    /// One-line description of the search state.
    pub fn search_status_text(&self) -> String {
        match &self.search_status {
            SearchStatus::Idle => "Type / to search".to_string(),
            SearchStatus::Searching => "Searching...".to_string(),
            SearchStatus::Found(1) => "1 result".to_string(),
            SearchStatus::Found(n) => format!("{n} results"),
            SearchStatus::Genre(genre) => format!("Genre: {genre}"),
        }
    }

    /// Keep every page's selection inside its list after `target` changed.
    fn clamp_selection(&mut self, page: Page, len: usize) {
        let slot = &mut self.selected[page_slot(page)];
        if *slot >= len {
            *slot = len.saturating_sub(1);
        }
    }
}

impl PresentationSink for App {
    fn show_page(&mut self, page: Page) {
        self.page = page;
    }

    fn update_player_info(&mut self, track: Option<&ListItem>, is_favorite: bool, is_preview: bool) {
        self.now_playing = track.cloned();
        self.now_favorite = is_favorite;
        self.now_preview = is_preview;
    }

    fn update_play_icons(&mut self, is_playing: bool) {
        self.playing = is_playing;
    }

    fn update_time_display(&mut self, current: Duration, duration: Duration) {
        self.elapsed = current;
        self.total = duration;
    }

    fn update_controls_state(&mut self, shuffle: bool, repeat: bool, queue_active: bool) {
        self.shuffle = shuffle;
        self.repeat = repeat;
        self.queue_view = queue_active;
    }

    fn render_track_list(&mut self, items: &[ListItem], target: TrackListTarget) {
        let page = match target {
            TrackListTarget::Library => {
                self.library = items.to_vec();
                Page::Library
            }
            TrackListTarget::Favorites => {
                self.favorites = items.to_vec();
                Page::Favorites
            }
            TrackListTarget::SearchResults => {
                self.results = items.to_vec();
                Page::Search
            }
        };
        self.clamp_selection(page, items.len());
    }

    fn render_queue_or_picks(&mut self, items: &[ListItem], title: &str) {
        self.sidebar = items.to_vec();
        self.sidebar_title = title.to_string();
    }

    fn render_recent_history(&mut self, items: &[ListItem]) {
        self.history = items.to_vec();
        self.clamp_selection(Page::Home, items.len());
    }

    fn update_search_status(&mut self, status: SearchStatus) {
        self.search_status = status;
    }

    fn show_message(&mut self, message: &str) {
        self.message = Some((message.to_string(), Instant::now()));
    }
}
