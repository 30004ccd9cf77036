//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model`; it is the coordinator's
//! presentation sink and holds page, selection and now-playing state.

mod model;

pub use model::*;
