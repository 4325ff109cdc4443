use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use super::sink::create_sink_at;
use super::types::{EngineCmd, EngineStatus, FinishCallback, FinishedTrack, SessionId, StatusHandle};

const TICK: Duration = Duration::from_millis(200);

struct Session {
    id: SessionId,
    path: PathBuf,
    sink: Sink,
    duration: Option<Duration>,
    /// Start of the sink inside the file when it was rebuilt by a seek.
    offset: Duration,
    paused: bool,
    finished: bool,
}

impl Session {
    fn position(&self) -> Duration {
        self.offset + self.sink.get_pos()
    }
}

/// Spawn the audio thread. `ready` receives the result of opening the
/// output device before any command is processed.
pub(super) fn spawn_audio_thread(
    rx: Receiver<EngineCmd>,
    status: StatusHandle,
    ready: Sender<Result<(), String>>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("audio".to_string())
        .spawn(move || {
            let mut stream = match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready.send(Err(format!("no audio output device: {e}")));
                    return;
                }
            };
            // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
            // but noisy for a TUI app.
            stream.log_on_drop(false);
            let _ = ready.send(Ok(()));

            run(&stream, &rx, &status);
            tracing::debug!("audio thread exiting");
        })
}

fn run(stream: &OutputStream, rx: &Receiver<EngineCmd>, status: &StatusHandle) {
    let mut session: Option<Session> = None;
    let mut volume: f32 = 1.0;
    let mut on_finish: Option<FinishCallback> = None;

    loop {
        match rx.recv_timeout(TICK) {
            Ok(cmd) => match cmd {
                EngineCmd::Load {
                    path,
                    session: id,
                    reply,
                } => {
                    // Decode first: the old sink survives a failed load.
                    match create_sink_at(stream, &path, Duration::ZERO) {
                        Ok((sink, duration)) => {
                            if let Some(old) = session.take() {
                                old.sink.stop();
                            }
                            sink.set_volume(volume);
                            session = Some(Session {
                                id,
                                path,
                                sink,
                                duration,
                                offset: Duration::ZERO,
                                paused: true,
                                finished: false,
                            });
                            publish(status, session.as_ref());
                            let _ = reply.send(Ok(duration));
                        }
                        Err(reason) => {
                            tracing::warn!(path = %path.display(), %reason, "load failed");
                            let _ = reply.send(Err(reason));
                        }
                    }
                }
                EngineCmd::Play => {
                    if let Some(s) = session.as_mut() {
                        s.sink.play();
                        s.paused = false;
                    }
                    publish(status, session.as_ref());
                }
                EngineCmd::Pause => {
                    if let Some(s) = session.as_mut() {
                        s.sink.pause();
                        s.paused = true;
                    }
                    publish(status, session.as_ref());
                }
                EngineCmd::Stop => {
                    if let Some(old) = session.take() {
                        old.sink.stop();
                    }
                    publish(status, None);
                }
                EngineCmd::SeekBy(secs) => {
                    if let Some(s) = session.as_mut() {
                        seek_by(stream, s, secs, volume);
                    }
                    publish(status, session.as_ref());
                }
                EngineCmd::SetVolume(v) => {
                    volume = f32::from(v.min(100)) / 100.0;
                    if let Some(s) = session.as_ref() {
                        s.sink.set_volume(volume);
                    }
                }
                EngineCmd::OnFinish(cb) => on_finish = Some(cb),
                EngineCmd::Quit => {
                    if let Some(old) = session.take() {
                        old.sink.stop();
                    }
                    publish(status, None);
                    break;
                }
            },
            Err(RecvTimeoutError::Timeout) => {
                let Some(s) = session.as_mut() else {
                    continue;
                };
                // Auto-advance: fires once when a playing sink drains.
                if !s.paused && !s.finished && s.sink.empty() {
                    s.finished = true;
                    s.paused = true;
                    tracing::debug!(session = %s.id, "track drained");
                    if let Some(cb) = on_finish.as_ref() {
                        cb(FinishedTrack {
                            session: s.id,
                            path: s.path.clone(),
                        });
                    }
                }
                publish(status, Some(&*s));
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn seek_by(stream: &OutputStream, s: &mut Session, secs: i64, volume: f32) {
    let cur = s.position();
    let mut target = if secs >= 0 {
        cur.saturating_add(Duration::from_secs(secs.unsigned_abs()))
    } else {
        cur.saturating_sub(Duration::from_secs(secs.unsigned_abs()))
    };
    if let Some(total) = s.duration {
        target = target.min(total);
    }

    if s.offset.is_zero() && s.sink.try_seek(target).is_ok() {
        return;
    }

    // Scrubbing fallback: rebuild the sink and skip into the file.
    match create_sink_at(stream, &s.path, target) {
        Ok((sink, _)) => {
            s.sink.stop();
            sink.set_volume(volume);
            if !s.paused {
                sink.play();
            }
            s.sink = sink;
            s.offset = target;
        }
        Err(reason) => tracing::warn!(path = %s.path.display(), %reason, "seek failed"),
    }
}

fn publish(status: &StatusHandle, session: Option<&Session>) {
    let Ok(mut info) = status.lock() else {
        return;
    };
    *info = match session {
        Some(s) => EngineStatus {
            session: Some(s.id),
            position: s.position(),
            duration: s.duration,
            playing: !s.paused,
        },
        None => EngineStatus::default(),
    };
}
