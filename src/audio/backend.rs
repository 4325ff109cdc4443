use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::library::Track;

use super::engine::AudioEngine;
use super::thread::spawn_audio_thread;
use super::types::{EngineCmd, EngineStatus, FinishCallback, SessionId, StatusHandle};

/// How long `load` waits for the audio thread to decode a header.
const LOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the `rodio` audio thread.
pub struct RodioEngine {
    tx: Sender<EngineCmd>,
    status: StatusHandle,
    join: Option<JoinHandle<()>>,
}

impl RodioEngine {
    /// Open the default output device on a new audio thread.
    pub fn spawn() -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let status: StatusHandle = Arc::new(Mutex::new(EngineStatus::default()));

        let join = spawn_audio_thread(rx, status.clone(), ready_tx)?;
        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => anyhow::bail!(reason),
            Err(_) => anyhow::bail!("audio thread exited during startup"),
        }

        Ok(Self {
            tx,
            status,
            join: Some(join),
        })
    }

    fn send(&self, cmd: EngineCmd) {
        if self.tx.send(cmd).is_err() {
            tracing::error!("audio thread is gone");
        }
    }

    fn snapshot(&self) -> EngineStatus {
        self.status.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl AudioEngine for RodioEngine {
    fn load(&mut self, track: &Track, session: SessionId) -> Result<Option<Duration>> {
        let path = track.path().to_path_buf();
        let load_failure = |reason: String| Error::EngineLoadFailure {
            path: path.clone(),
            reason,
        };

        let (reply, answer) = mpsc::channel();
        self.tx
            .send(EngineCmd::Load {
                path: path.clone(),
                session,
                reply,
            })
            .map_err(|_| load_failure("audio thread is gone".to_string()))?;

        match answer.recv_timeout(LOAD_TIMEOUT) {
            Ok(Ok(duration)) => Ok(duration),
            Ok(Err(reason)) => Err(load_failure(reason)),
            Err(_) => Err(load_failure("audio thread did not answer".to_string())),
        }
    }

    fn play(&mut self) {
        self.send(EngineCmd::Play);
    }

    fn pause(&mut self) {
        self.send(EngineCmd::Pause);
    }

    fn stop(&mut self) {
        self.send(EngineCmd::Stop);
    }

    fn seek(&mut self, delta_secs: i64) {
        self.send(EngineCmd::SeekBy(delta_secs));
    }

    fn position(&self) -> Duration {
        self.snapshot().position
    }

    fn duration(&self) -> Option<Duration> {
        self.snapshot().duration
    }

    fn set_volume(&mut self, volume: u8) {
        self.send(EngineCmd::SetVolume(volume));
    }

    fn on_finish(&mut self, callback: FinishCallback) {
        self.send(EngineCmd::OnFinish(callback));
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        let _ = self.tx.send(EngineCmd::Quit);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
