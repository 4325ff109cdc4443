//! Playback state machine.
//!
//! `Player` owns the audio engine and decides what plays next. It never
//! runs hooks itself: lifecycle events are collected and handed to the
//! runtime through [`Player::take_events`], which fires them once no
//! player or queue borrow is live.

use std::mem;
use std::time::Duration;

use crate::audio::{AudioEngine, FinishCallback, FinishedTrack, SessionId};
use crate::error::{Error, Result};
use crate::hooks::HookEvent;
use crate::library::Track;
use crate::queue::PlaybackQueue;


pub const VOLUME_STEP: u8 = 5;
pub const MAX_VOLUME: u8 = 100;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    #[default]
    Idle,
    Playing,
    Paused,
    /// The track ran out; the next one has not started yet.
    Stopped,
}

/// What a skip or a completion led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Playing(Track),
    /// Nothing left to play; the caller shows the idle view.
    Idle,
    /// A completion from a session that is no longer live.
    Ignored,
}

pub struct Player {
    engine: Box<dyn AudioEngine>,
    status: PlayerStatus,
    now_playing: Option<Track>,
    session: Option<SessionId>,
    last_session: SessionId,
    volume: u8,
    events: Vec<HookEvent>,
}

impl Player {
    pub fn new(mut engine: Box<dyn AudioEngine>, volume: u8) -> Self {
        let volume = volume.min(MAX_VOLUME);
        engine.set_volume(volume);
        Self {
            engine,
            status: PlayerStatus::Idle,
            now_playing: None,
            session: None,
            last_session: SessionId::default(),
            volume,
            events: Vec::new(),
        }
    }

    /// Register the completion callback on the engine.
    pub fn on_finish(&mut self, callback: FinishCallback) {
        self.engine.on_finish(callback);
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn now_playing(&self) -> Option<&Track> {
        self.now_playing.as_ref()
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn position(&self) -> Duration {
        match self.status {
            PlayerStatus::Playing | PlayerStatus::Paused => self.engine.position(),
            _ => Duration::ZERO,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.engine
            .duration()
            .or_else(|| self.now_playing.as_ref().and_then(Track::cached_duration))
    }

    /// Drain the lifecycle events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<HookEvent> {
        mem::take(&mut self.events)
    }

    /// Load `track` into a fresh engine session and start it.
    ///
    /// On failure nothing changes: the previous track (if any) keeps
    /// playing and the status stays as it was.
    pub fn play_track(&mut self, track: &Track) -> Result<()> {
        let session = self.last_session.next();
        self.last_session = session;

        let duration = self.engine.load(track, session).inspect_err(|e| {
            tracing::warn!(track = %track.path().display(), error = %e, "could not start track");
        })?;
        if let Some(d) = duration {
            track.cache_duration(d);
        }
        self.engine.play();

        tracing::info!(track = %track.path().display(), %session, "now playing");
        self.session = Some(session);
        self.now_playing = Some(track.clone());
        self.status = PlayerStatus::Playing;
        self.events.push(HookEvent::NewSong);
        self.events.push(HookEvent::Play);
        Ok(())
    }

    /// Play the queue's current item. Past the end of a non-empty queue
    /// playback starts over from the head.
    pub fn play_queue(&mut self, queue: &mut PlaybackQueue) -> Result<()> {
        match queue.cursor() {
            Some(index) => self.play_at(queue, index),
            None if !queue.is_empty() => self.play_at(queue, 0),
            None => Err(Error::EmptyQueue),
        }
    }

    /// Play the item at `index` and make it current. The cursor only moves
    /// once the track has started.
    pub fn play_at(&mut self, queue: &mut PlaybackQueue, index: usize) -> Result<()> {
        let track = queue.get(index).cloned().ok_or(Error::IndexOutOfRange {
            index,
            len: queue.len(),
        })?;
        self.play_track(&track)?;
        queue.select(index)?;
        queue.mark_live();
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> PlayerStatus {
        match self.status {
            PlayerStatus::Playing => {
                self.engine.pause();
                self.status = PlayerStatus::Paused;
                self.events.push(HookEvent::Pause);
            }
            PlayerStatus::Paused => {
                self.engine.play();
                self.status = PlayerStatus::Playing;
                self.events.push(HookEvent::Play);
            }
            PlayerStatus::Idle | PlayerStatus::Stopped => {}
        }
        self.status
    }

    /// End the current track early and move on as if it had finished.
    pub fn skip(&mut self, queue: &mut PlaybackQueue) -> Result<Advance> {
        if self.session.is_none() {
            return Err(Error::EmptyQueue);
        }
        let mark = self.events.len();
        let advance = self.advance(queue)?;
        self.events.insert(mark, HookEvent::Skip);
        Ok(advance)
    }

    /// Handle a completion notification from the engine.
    pub fn on_track_finished(
        &mut self,
        queue: &mut PlaybackQueue,
        finished: &FinishedTrack,
    ) -> Result<Advance> {
        if self.session != Some(finished.session) {
            tracing::debug!(
                stale = %finished.session,
                live = ?self.session,
                "ignoring completion of a replaced track"
            );
            return Ok(Advance::Ignored);
        }
        self.status = PlayerStatus::Stopped;

        match self.advance(queue) {
            Ok(advance) => Ok(advance),
            Err(e) => {
                // The finished track is gone either way.
                queue.advance();
                self.go_idle();
                Err(e)
            }
        }
    }

    /// Load the track that follows the current one, then commit the queue
    /// change. The queue is left alone when the load fails.
    fn advance(&mut self, queue: &mut PlaybackQueue) -> Result<Advance> {
        match queue.peek_advance().cloned() {
            Some(next) => {
                self.play_track(&next)?;
                queue.advance();
                queue.mark_live();
                Ok(Advance::Playing(next))
            }
            None => {
                queue.advance();
                self.go_idle();
                Ok(Advance::Idle)
            }
        }
    }

    /// Move the playhead by `delta_secs`, clamped to the track bounds.
    /// Returns the new position.
    pub fn seek(&mut self, delta_secs: i64) -> Result<Duration> {
        if !matches!(self.status, PlayerStatus::Playing | PlayerStatus::Paused) {
            return Err(Error::EmptyQueue);
        }
        let pos = self.engine.position().as_secs() as i64;
        let mut target = (pos + delta_secs).max(0);
        if let Some(total) = self.duration() {
            target = target.min(total.as_secs() as i64);
        }
        if target != pos {
            self.engine.seek(target - pos);
        }
        Ok(Duration::from_secs(target as u64))
    }

    /// Set the volume, clamped to 0..=100.
    pub fn set_volume(&mut self, volume: i64) -> u8 {
        self.volume = volume.clamp(0, i64::from(MAX_VOLUME)) as u8;
        self.engine.set_volume(self.volume);
        self.volume
    }

    pub fn volume_up(&mut self) -> u8 {
        self.set_volume(i64::from(self.volume) + i64::from(VOLUME_STEP))
    }

    pub fn volume_down(&mut self) -> u8 {
        self.set_volume(i64::from(self.volume) - i64::from(VOLUME_STEP))
    }

    /// Tear the live session down and return to idle.
    pub fn stop(&mut self) {
        if self.session.is_some() {
            self.go_idle();
        }
        self.status = PlayerStatus::Idle;
    }

    fn go_idle(&mut self) {
        self.engine.stop();
        self.session = None;
        self.now_playing = None;
        self.status = PlayerStatus::Idle;
    }
}
