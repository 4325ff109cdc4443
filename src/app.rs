//! Application module: UI state used by the TUI and the runtime.
//!
//! The `App` model lives in `app::model` and holds the library listing,
//! the per-panel selections, popups and transient notifications.

mod model;
mod popup;

pub use model::*;
pub use popup::*;

#[cfg(test)]
mod tests;
