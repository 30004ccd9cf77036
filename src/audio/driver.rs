//! rodio-backed media driver.
//!
//! Seeking rebuilds the sink and skips into the decoded stream, so the driver
//! keeps the raw media around (a path or the downloaded bytes) for as long as
//! the source stays loaded.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use reqwest::blocking::Client;
use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use thiserror::Error;

use super::fetch::{FetchResult, is_remote, spawn_fetch};
use super::types::{MediaDriver, MediaError, MediaEvent};

#[derive(Debug, Error)]
pub enum DriverInitError {
    #[error("no audio output device: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("cannot build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Clone)]
enum Media {
    Local(PathBuf),
    Remote(Arc<[u8]>),
}

pub struct RodioDriver {
    stream: OutputStream,
    http: Client,
    media: Option<Media>,
    pending: Option<Receiver<FetchResult>>,
    sink: Option<Sink>,
    /// Where the current sink started inside the track.
    offset: Duration,
    duration: Option<Duration>,
    volume: f32,
    play_when_ready: bool,
    ended_sent: bool,
    events: Vec<MediaEvent>,
}

impl RodioDriver {
    /// Open the default output device.
    pub fn open(fetch_timeout: Duration) -> Result<Self, DriverInitError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when the stream is dropped, which would garble the TUI.
        stream.log_on_drop(false);
        let http = Client::builder().timeout(fetch_timeout).build()?;

        Ok(Self {
            stream,
            http,
            media: None,
            pending: None,
            sink: None,
            offset: Duration::ZERO,
            duration: None,
            volume: 1.0,
            play_when_ready: false,
            ended_sent: false,
            events: Vec::new(),
        })
    }

    fn reset(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.media = None;
        self.pending = None;
        self.offset = Duration::ZERO;
        self.duration = None;
        self.play_when_ready = false;
        self.ended_sent = false;
        self.events.clear();
    }

    fn fail(&mut self, err: MediaError) {
        log::error!("audio error: {err}");
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.play_when_ready = false;
        self.events.push(MediaEvent::Error(err));
    }

    /// Build a fresh sink for the loaded media starting at `start_at`.
    fn open_at(&mut self, start_at: Duration) -> Result<(), MediaError> {
        let media = self.media.clone().ok_or(MediaError::Unsupported)?;
        let sink = match media {
            Media::Local(path) => {
                let file = File::open(&path).map_err(|e| MediaError::Network(e.to_string()))?;
                let decoder = Decoder::new(BufReader::new(file)).map_err(decode_error)?;
                self.attach(decoder, start_at)
            }
            Media::Remote(bytes) => {
                let decoder = Decoder::new(Cursor::new(bytes)).map_err(decode_error)?;
                self.attach(decoder, start_at)
            }
        };

        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        self.offset = start_at;
        self.ended_sent = false;
        Ok(())
    }

    fn attach<S>(&mut self, source: S, start_at: Duration) -> Sink
    where
        S: Source + Send + 'static,
    {
        if self.duration.is_none() {
            self.duration = source.total_duration().filter(|d| !d.is_zero());
        }

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
        sink.append(source.skip_duration(start_at));
        if self.play_when_ready {
            sink.play();
        } else {
            sink.pause();
        }
        sink
    }

    fn poll_pending(&mut self) {
        let Some(rx) = self.pending.as_ref() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(MediaError::Aborted),
        };
        self.pending = None;

        let opened = result.and_then(|bytes| {
            self.media = Some(Media::Remote(bytes.into()));
            self.open_at(Duration::ZERO)
        });
        if let Err(e) = opened {
            self.fail(e);
        }
    }

    fn is_finished(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| s.empty())
    }
}

impl MediaDriver for RodioDriver {
    fn load(&mut self, source: &str) {
        self.reset();

        let source = source.trim();
        if source.is_empty() {
            log::warn!("no track source provided");
            self.events.push(MediaEvent::Error(MediaError::Unsupported));
            return;
        }

        log::debug!("loading {source}");
        if is_remote(source) {
            self.pending = Some(spawn_fetch(self.http.clone(), source.to_string()));
        } else {
            self.media = Some(Media::Local(PathBuf::from(source)));
            if let Err(e) = self.open_at(Duration::ZERO) {
                self.fail(e);
            }
        }
    }

    fn play(&mut self) {
        if self.sink.is_none() && self.pending.is_none() {
            log::warn!("play requested with no source loaded");
            self.fail(MediaError::Unsupported);
            return;
        }
        self.play_when_ready = true;
        if let Some(s) = &self.sink {
            s.play();
        }
    }

    fn pause(&mut self) {
        self.play_when_ready = false;
        if let Some(s) = &self.sink {
            s.pause();
        }
    }

    fn stop(&mut self) {
        self.pause();
        if self.sink.is_some() && self.media.is_some() {
            if let Err(e) = self.open_at(Duration::ZERO) {
                self.fail(e);
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
        if let Some(s) = &self.sink {
            s.set_volume(self.volume);
        }
    }

    fn current_time(&self) -> Duration {
        if self.sink.is_none() {
            return Duration::ZERO;
        }
        reported_position(
            self.offset + self.elapsed_in_sink(),
            self.duration,
            self.is_finished(),
        )
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn seek_to(&mut self, position: Duration) {
        let Some(duration) = self.duration else {
            return;
        };
        if self.media.is_none() {
            return;
        }
        if let Err(e) = self.open_at(position.min(duration)) {
            self.fail(e);
        }
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        self.poll_pending();

        if self.play_when_ready && !self.ended_sent {
            if self.is_finished() {
                self.ended_sent = true;
                self.events.push(MediaEvent::Ended);
            } else if self.sink.is_some() {
                self.events.push(MediaEvent::TimeUpdate(self.current_time()));
            }
        }

        std::mem::take(&mut self.events)
    }
}

impl RodioDriver {
    fn elapsed_in_sink(&self) -> Duration {
        self.sink.as_ref().map_or(Duration::ZERO, |s| s.get_pos())
    }
}

fn decode_error(e: DecoderError) -> MediaError {
    match e {
        DecoderError::UnrecognizedFormat => MediaError::Unsupported,
        other => MediaError::Decode(other.to_string()),
    }
}

pub(super) fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Position as the player should see it: never past the known end, and pinned
/// to the end once the sink has drained.
pub(super) fn reported_position(
    elapsed: Duration,
    duration: Option<Duration>,
    finished: bool,
) -> Duration {
    match duration {
        Some(d) if finished => d,
        Some(d) => elapsed.min(d),
        None => elapsed,
    }
}
