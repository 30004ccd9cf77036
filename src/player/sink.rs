use std::time::Duration;

use super::types::{ListItem, Page, SearchStatus, TrackListTarget};

/// Passive consumer of display updates pushed by the coordinator.
///
/// Calls are fire-and-forget; implementations must not call back into the
/// coordinator.
pub trait PresentationSink {
    fn show_page(&mut self, page: Page);
    fn update_player_info(&mut self, track: Option<&ListItem>, is_favorite: bool, is_preview: bool);
    fn update_play_icons(&mut self, is_playing: bool);
    fn update_time_display(&mut self, current: Duration, duration: Duration);
    fn update_controls_state(&mut self, shuffle: bool, repeat: bool, queue_active: bool);
    fn render_track_list(&mut self, items: &[ListItem], target: TrackListTarget);
    fn render_queue_or_picks(&mut self, items: &[ListItem], title: &str);
    fn render_recent_history(&mut self, items: &[ListItem]);
    fn update_search_status(&mut self, status: SearchStatus);
    /// Transient user-facing notice (queue additions, media errors).
    fn show_message(&mut self, message: &str);
}
