//! Library module: catalog tracks, foreign previews and catalog sources.
//!
//! The catalog is fixed once the player starts. Tracks come from a scanned
//! directory, the persisted state file or the built-in defaults; only the
//! `favorite` flag changes afterwards.

mod catalog;
mod defaults;
mod model;
mod scan;

pub use catalog::*;
pub use defaults::default_tracks;
pub use model::*;
pub use scan::scan;

#[cfg(test)]
mod tests;
