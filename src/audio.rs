//! Audio engine boundary.
//!
//! `AudioEngine` is the contract the player state machine drives; the
//! production implementation decodes with `rodio` on a dedicated thread
//! and reports finished tracks through the `on_finish` callback.

mod backend;
mod engine;
mod sink;
mod thread;
mod types;

pub use backend::RodioEngine;
pub use engine::*;
pub use types::{FinishedTrack, SessionId};

#[cfg(test)]
pub mod fake;

#[cfg(test)]
mod tests;
