//! Background work that reports back to the event loop.

use std::io;
use std::process::Command as Process;
use std::sync::mpsc::Sender;
use std::thread;

use crate::audio::FinishedTrack;
use crate::script::CallbackId;

/// Messages from background threads, drained at the top of each loop turn.
#[derive(Debug)]
pub enum LoopEvent {
    TrackFinished(FinishedTrack),
    ShellDone {
        callback: Option<CallbackId>,
        output: String,
        ok: bool,
    },
}

/// Run `command` through `sh -c` on a worker thread.
///
/// Combined stdout and stderr come back as `LoopEvent::ShellDone`; a
/// command that cannot be spawned reports the spawn error as its output.
pub fn spawn_shell(
    command: String,
    callback: Option<CallbackId>,
    tx: Sender<LoopEvent>,
) -> io::Result<()> {
    thread::Builder::new()
        .name("shell".to_string())
        .spawn(move || {
            let (output, ok) = match Process::new("sh").arg("-c").arg(&command).output() {
                Ok(out) => {
                    let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
                    text.push_str(&String::from_utf8_lossy(&out.stderr));
                    (text, out.status.success())
                }
                Err(e) => (e.to_string(), false),
            };
            tracing::debug!(%command, ok, "shell command finished");
            let _ = tx.send(LoopEvent::ShellDone {
                callback,
                output,
                ok,
            });
        })
        .map(drop)
}
