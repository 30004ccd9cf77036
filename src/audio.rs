//! Media driver: the single playable resource the player commands.
//!
//! `MediaDriver` is the seam the coordinator talks to; `RodioDriver` is the
//! implementation used at runtime. Failures never propagate to callers, they
//! come back as `MediaEvent::Error` from `poll_events`.

mod driver;
mod fetch;
mod types;

pub use driver::{DriverInitError, RodioDriver};
pub use types::*;

#[cfg(test)]
mod tests;
