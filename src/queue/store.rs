use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};

use super::playback::PlaybackQueue;

enum StoreMsg {
    Save(Vec<u8>),
    Flush(Sender<()>),
}

/// Background writer for the persisted queue file.
///
/// Snapshots are written in submission order by one thread, so the file is
/// never written concurrently; bursts of saves collapse into the latest one.
#[derive(Debug)]
pub struct QueueStore {
    path: PathBuf,
    tx: Sender<StoreMsg>,
    join: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for StoreMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Save(bytes) => write!(f, "Save({} bytes)", bytes.len()),
            Self::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl QueueStore {
    pub fn spawn(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let (tx, rx) = mpsc::channel::<StoreMsg>();
        let thread_path = path.clone();
        let join = thread::Builder::new()
            .name("queue-store".to_string())
            .spawn(move || writer_loop(&thread_path, rx))
            .map_err(Error::persistence)?;

        Ok(Self {
            path,
            tx,
            join: Some(join),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queue a snapshot for writing. Never blocks.
    pub fn save(&self, contents: Vec<u8>) {
        if self.tx.send(StoreMsg::Save(contents)).is_err() {
            tracing::warn!("queue writer is gone; snapshot dropped");
        }
    }

    /// Block until every snapshot submitted so far is on disk.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.tx.send(StoreMsg::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Replace `queue` with the contents of the persisted file.
    pub fn load_into(&self, queue: &mut PlaybackQueue) -> Result<usize> {
        let file = File::open(&self.path).map_err(|e| {
            Error::Persistence(format!("{}: {e}", self.path.display()))
        })?;
        queue.load_persisted(BufReader::new(file))
    }
}

impl Drop for QueueStore {
    fn drop(&mut self) {
        // Closing the channel ends the writer loop once pending saves are done.
        let (dead_tx, _) = mpsc::channel();
        drop(std::mem::replace(&mut self.tx, dead_tx));
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn writer_loop(path: &Path, rx: Receiver<StoreMsg>) {
    while let Ok(msg) = rx.recv() {
        let mut latest: Option<Vec<u8>> = None;
        let mut acks: Vec<Sender<()>> = Vec::new();
        let mut next = Some(msg);

        while let Some(msg) = next.take() {
            match msg {
                StoreMsg::Save(contents) => latest = Some(contents),
                StoreMsg::Flush(ack) => acks.push(ack),
            }
            next = rx.try_recv().ok();
        }

        if let Some(contents) = latest {
            if let Err(e) = write_queue_file(path, &contents) {
                tracing::warn!(path = %path.display(), error = %e, "failed to save queue");
            } else {
                tracing::debug!(bytes = contents.len(), "queue saved");
            }
        }
        for ack in acks {
            let _ = ack.send(());
        }
    }
}

/// Replace `path` with `contents` atomically.
pub fn write_queue_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}
