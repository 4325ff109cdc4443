use std::time::Duration;

use crate::error::Result;
use crate::library::Track;

pub use super::types::FinishCallback;
use super::types::SessionId;

/// Decode-and-stream capability driven by [`crate::player::Player`].
///
/// Implementations hold at most one live session. `load` must leave the
/// current session untouched when it fails, so the player can stay in its
/// previous state.
pub trait AudioEngine {
    /// Prepare `track` (paused) as session `session`, tearing down the
    /// previous one. Returns the duration when the decoder knows it.
    fn load(&mut self, track: &Track, session: SessionId) -> Result<Option<Duration>>;

    fn play(&mut self);

    fn pause(&mut self);

    /// Tear the live session down without reporting it as finished.
    fn stop(&mut self);

    /// Move the playhead by `delta_secs` (negative rewinds).
    fn seek(&mut self, delta_secs: i64);

    fn position(&self) -> Duration;

    fn duration(&self) -> Option<Duration>;

    /// 0..=100.
    fn set_volume(&mut self, volume: u8);

    /// Register the completion callback. It runs off the UI loop, once per
    /// session, and must only hand the notification over.
    fn on_finish(&mut self, callback: FinishCallback);
}
