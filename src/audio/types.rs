//! Media driver contract and the events it reports.

use std::time::Duration;

use thiserror::Error;

/// Why a source could not be loaded or played.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("Fetching process aborted")]
    Aborted,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Decoding error: {0}")]
    Decode(String),
    #[error("Format not supported")]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// Best-effort position report while playing.
    TimeUpdate(Duration),
    /// The loaded source played to its natural end.
    Ended,
    Error(MediaError),
}

/// Commands and queries on the one live media resource.
///
/// Loading a new source replaces the previous one. None of these calls block
/// on I/O or fail to the caller.
pub trait MediaDriver {
    /// Replace the current resource. An empty source is reported as an error event.
    fn load(&mut self, source: &str);
    /// Start or resume playback; starts once ready if the resource is still loading.
    fn play(&mut self);
    fn pause(&mut self);
    /// Pause and rewind to the start.
    fn stop(&mut self);
    /// Volume is clamped to `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32);
    /// Zero when nothing is loaded.
    fn current_time(&self) -> Duration;
    /// `None` until the resource reports a usable length.
    fn duration(&self) -> Option<Duration>;
    /// No-op while the duration is unknown.
    fn seek_to(&mut self, position: Duration);
    /// Drain events produced since the last call.
    fn poll_events(&mut self) -> Vec<MediaEvent>;
}
