//! The playback queue and its on-disk persistence.
//!
//! `PlaybackQueue` is owned by the runtime loop. Every structural mutation
//! hands a path snapshot to the attached `QueueStore`, whose single writer
//! thread keeps `queue.cache` close to the live queue.

mod playback;
mod store;

pub use playback::*;
pub use store::*;
