//! Error taxonomy shared by the queue, player and script layers.
//!
//! Every variant except `ScriptExecution` raised by the default
//! configuration is recoverable: callers surface it as a transient
//! notification and keep their last good state.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Enqueue of a directory, a non-audio file or a missing file.
    #[error("not a playable audio file: {}", .0.display())]
    InvalidTrack(PathBuf),

    /// The operation needs a current item and there is none.
    #[error("queue is empty")]
    EmptyQueue,

    /// The audio engine could not open or start a track.
    #[error("failed to load {}: {reason}", path.display())]
    EngineLoadFailure { path: PathBuf, reason: String },

    /// A script failed to parse or run.
    #[error("script error: {0}")]
    ScriptExecution(String),

    /// Queue or config file could not be read or written.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Keybind dispatch miss; drives fallback lookup.
    #[error("no binding for {key} in {context}")]
    BindingNotFound { context: String, key: String },

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn script(err: impl std::fmt::Display) -> Self {
        Self::ScriptExecution(err.to_string())
    }

    /// `BindingNotFound` is control flow, not a failure worth surfacing.
    pub fn is_binding_miss(&self) -> bool {
        matches!(self, Self::BindingNotFound { .. })
    }
}

impl From<mlua::Error> for Error {
    fn from(err: mlua::Error) -> Self {
        Self::ScriptExecution(err.to_string())
    }
}
