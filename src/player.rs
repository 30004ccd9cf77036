//! Playback coordination.
//!
//! `Coordinator` owns every piece of session state (what is loaded, play/pause,
//! shuffle/repeat, the manual queue, recent history, the active poll timer)
//! and is the only component that commands the media driver. Display updates
//! are pushed to a `PresentationSink`.

mod coordinator;
mod history;
mod poll;
mod queue;
mod remote;
mod sink;
mod types;

pub use coordinator::{Coordinator, Options};
pub use history::History;
pub use poll::{EndPolicy, TimerHandle};
pub use queue::PlayQueue;
pub use sink::PresentationSink;
pub use types::*;
