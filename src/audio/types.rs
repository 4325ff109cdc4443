//! Small types shared between the engine handle and the audio thread.

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Identifies one load of one track. Increases with every load, so a
/// completion carrying an older id belongs to a track that is gone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionId(pub u64);

impl SessionId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sent once per session when the engine runs out of audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedTrack {
    pub session: SessionId,
    pub path: PathBuf,
}

pub type FinishCallback = Box<dyn Fn(FinishedTrack) + Send + 'static>;

pub(super) type LoadReply = Sender<Result<Option<Duration>, String>>;

pub(super) enum EngineCmd {
    /// Decode `path`; the live session is replaced only if this succeeds.
    Load {
        path: PathBuf,
        session: SessionId,
        reply: LoadReply,
    },
    Play,
    Pause,
    Stop,
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i64),
    /// Linear volume, 0..=100.
    SetVolume(u8),
    OnFinish(FinishCallback),
    Quit,
}

/// Playback information published by the audio thread for polling.
#[derive(Debug, Clone, Default)]
pub(super) struct EngineStatus {
    pub session: Option<SessionId>,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub playing: bool,
}

pub(super) type StatusHandle = Arc<Mutex<EngineStatus>>;
