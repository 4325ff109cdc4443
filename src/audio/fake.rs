//! Scripted engine for exercising the player without an audio device.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::library::Track;

use super::engine::AudioEngine;
use super::types::{FinishCallback, FinishedTrack, SessionId};

#[derive(Debug, Default)]
pub struct FakeState {
    pub calls: Vec<String>,
    pub failing: HashSet<PathBuf>,
    pub loaded: Option<(SessionId, PathBuf)>,
    pub playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: Option<u8>,
    /// Duration reported by the next successful `load`.
    pub next_duration: Option<Duration>,
    pub has_finish_callback: bool,
}

impl FakeState {
    pub fn fail_on(&mut self, path: impl AsRef<Path>) {
        self.failing.insert(path.as_ref().to_path_buf());
    }

    /// Completion notification for the loaded session, as the audio thread
    /// would send it.
    pub fn finished(&self) -> FinishedTrack {
        let (session, path) = self.loaded.clone().unwrap_or_default();
        FinishedTrack { session, path }
    }
}

pub struct FakeEngine {
    state: Rc<RefCell<FakeState>>,
}

impl FakeEngine {
    pub fn new() -> (Self, Rc<RefCell<FakeState>>) {
        let state = Rc::new(RefCell::new(FakeState {
            next_duration: Some(Duration::from_secs(180)),
            ..FakeState::default()
        }));
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

impl AudioEngine for FakeEngine {
    fn load(&mut self, track: &Track, session: SessionId) -> Result<Option<Duration>> {
        let mut s = self.state.borrow_mut();
        s.calls.push(format!("load {}", track.name()));
        if s.failing.contains(track.path()) {
            return Err(Error::EngineLoadFailure {
                path: track.path().to_path_buf(),
                reason: "scripted failure".to_string(),
            });
        }
        s.loaded = Some((session, track.path().to_path_buf()));
        s.playing = false;
        s.position = Duration::ZERO;
        s.duration = s.next_duration;
        Ok(s.duration)
    }

    fn play(&mut self) {
        let mut s = self.state.borrow_mut();
        s.calls.push("play".to_string());
        s.playing = true;
    }

    fn pause(&mut self) {
        let mut s = self.state.borrow_mut();
        s.calls.push("pause".to_string());
        s.playing = false;
    }

    fn stop(&mut self) {
        let mut s = self.state.borrow_mut();
        s.calls.push("stop".to_string());
        s.loaded = None;
        s.playing = false;
        s.position = Duration::ZERO;
        s.duration = None;
    }

    fn seek(&mut self, delta_secs: i64) {
        let mut s = self.state.borrow_mut();
        s.calls.push(format!("seek {delta_secs}"));
        let cur = s.position.as_secs() as i64;
        s.position = Duration::from_secs((cur + delta_secs).max(0) as u64);
    }

    fn position(&self) -> Duration {
        self.state.borrow().position
    }

    fn duration(&self) -> Option<Duration> {
        self.state.borrow().duration
    }

    fn set_volume(&mut self, volume: u8) {
        self.state.borrow_mut().volume = Some(volume);
    }

    fn on_finish(&mut self, _callback: FinishCallback) {
        self.state.borrow_mut().has_finish_callback = true;
    }
}
