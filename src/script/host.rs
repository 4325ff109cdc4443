//! Values exchanged between scripts and the event loop.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::commands::Command;
use crate::library::Track;

/// Handle to a Lua callback parked until the loop has a result for it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CallbackId(pub u64);

/// Something a script asked the host to do. Queued by the Lua globals and
/// executed by the loop once the current dispatch has returned.
#[derive(Debug, Clone, PartialEq)]
pub enum HostRequest {
    Info { title: String, text: String },
    Debug { text: String },
    Timed { title: String, text: String },
    Input { prompt: String, callback: CallbackId },
    Search {
        title: String,
        items: Vec<String>,
        callback: CallbackId,
    },
    Shell {
        command: String,
        callback: Option<CallbackId>,
    },
    FocusPath(PathBuf),
    Command(Command),
}

/// Read-only track snapshot handed to scripts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackInfo {
    pub path: String,
    pub name: String,
    /// Seconds, when known.
    pub duration: Option<f64>,
}

impl TrackInfo {
    pub fn from_track(track: &Track) -> Self {
        Self {
            path: track.path().display().to_string(),
            name: track.name().to_string(),
            duration: track.duration().as_ref().map(Duration::as_secs_f64),
        }
    }
}

/// Host state visible to the accessor modules, refreshed by the loop
/// before every dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostView {
    pub playlist_focused: Option<TrackInfo>,
    pub queue_focused: Option<TrackInfo>,
    pub now_playing: Option<TrackInfo>,
}
