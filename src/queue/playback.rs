use std::io::{BufRead, Write};

use rand::seq::SliceRandom;

use crate::error::{Error, Result};
use crate::library::{DEFAULT_EXTENSIONS, Track};

use super::store::QueueStore;

/// What happens to a finished track when loop mode is on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LoopPolicy {
    /// Remove the finished track and append it at the tail.
    #[default]
    AppendAtTail,
    /// Leave the finished track in place and move the cursor past it.
    ReplayInPlace,
}

/// Ordered tracks plus a cursor on the current one.
///
/// The cursor is `None` when there is no current item: either the queue is
/// empty, or playback ran past the tail with loop mode off. In the latter
/// case the next enqueued track becomes current.
///
/// The current item is *live* once the player has started it. Removing
/// the live item moves the cursor onto a track that has not played yet,
/// so the next advance starts that track instead of retiring it.
#[derive(Debug)]
pub struct PlaybackQueue {
    items: Vec<Track>,
    cursor: Option<usize>,
    live: bool,
    loop_mode: bool,
    loop_policy: LoopPolicy,
    extensions: Vec<String>,
    store: Option<QueueStore>,
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            live: false,
            loop_mode: false,
            loop_policy: LoopPolicy::default(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            store: None,
        }
    }

    /// Extensions used to resolve paths read by [`Self::load_persisted`].
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Attach the background writer; every later mutation is saved.
    pub fn attach_store(&mut self, store: QueueStore) {
        self.store = Some(store);
    }

    pub fn store(&self) -> Option<&QueueStore> {
        self.store.as_ref()
    }

    pub fn items(&self) -> &[Track] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|i| self.items.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.items.get(index)
    }

    /// Whether the current item is the track the player last started.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Record that the current item is now playing.
    pub fn mark_live(&mut self) {
        self.live = self.cursor.is_some();
    }

    pub fn loop_mode(&self) -> bool {
        self.loop_mode
    }

    pub fn set_loop_mode(&mut self, on: bool) {
        self.loop_mode = on;
    }

    pub fn toggle_loop(&mut self) -> bool {
        self.loop_mode = !self.loop_mode;
        self.loop_mode
    }

    pub fn loop_policy(&self) -> LoopPolicy {
        self.loop_policy
    }

    pub fn set_loop_policy(&mut self, policy: LoopPolicy) {
        self.loop_policy = policy;
    }

    /// Append `track`; returns its index.
    pub fn enqueue(&mut self, track: Track) -> Result<usize> {
        if !track.is_audio_file() {
            return Err(Error::InvalidTrack(track.path().to_path_buf()));
        }
        let index = self.push(track);
        self.autosave();
        Ok(index)
    }

    /// Remove and return the current item.
    pub fn dequeue_current(&mut self) -> Result<Track> {
        let i = self.cursor.ok_or(Error::EmptyQueue)?;
        let track = self.remove_at(i);
        self.autosave();
        Ok(track)
    }

    /// Remove the item at `index`, keeping the cursor on the same track
    /// when another item was removed.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        self.check_index(index)?;
        let track = self.remove_at(index);
        self.autosave();
        Ok(track)
    }

    /// Swap the items at `from` and `to`; the cursor follows its track.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        self.items.swap(from, to);
        self.cursor = match self.cursor {
            Some(c) if c == from => Some(to),
            Some(c) if c == to => Some(from),
            other => other,
        };
        self.autosave();
        Ok(())
    }

    /// Make `index` the current item.
    pub fn select(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        if self.cursor != Some(index) {
            self.cursor = Some(index);
            self.live = false;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.cursor = None;
        self.live = false;
        self.autosave();
    }

    /// Shuffle the items; the cursor keeps pointing at the current track.
    pub fn shuffle(&mut self) {
        let current = self.current().cloned();
        self.items.shuffle(&mut rand::rng());
        if let Some(track) = current {
            self.cursor = self.items.iter().position(|t| *t == track);
        }
        self.autosave();
    }

    /// The track that would become current if the current one finished now.
    ///
    /// When the current item has not started yet it is the one up next.
    pub fn peek_advance(&self) -> Option<&Track> {
        let i = self.cursor?;
        if !self.live {
            return self.items.get(i);
        }
        let len = self.items.len();
        if !self.loop_mode {
            return self.items.get(i + 1);
        }
        match self.loop_policy {
            LoopPolicy::ReplayInPlace => self.items.get((i + 1) % len),
            // Removing the tail wraps to the head; a single item comes back
            // as the only element.
            LoopPolicy::AppendAtTail => self.items.get(i + 1).or_else(|| self.items.first()),
        }
    }

    /// Retire the current track and move to the next one, applying loop
    /// mode and policy. Returns the new current track, which is not live
    /// until the player marks it.
    ///
    /// A current item that never started is not retired: it stays current.
    pub fn advance(&mut self) -> Option<Track> {
        let i = self.cursor?;
        if !self.live {
            return self.current().cloned();
        }
        self.live = false;
        if self.loop_mode && self.loop_policy == LoopPolicy::ReplayInPlace {
            self.cursor = Some((i + 1) % self.items.len());
        } else {
            let finished = self.dequeue_current().ok()?;
            if self.loop_mode {
                self.push(finished);
                self.autosave();
            }
        }
        self.current().cloned()
    }

    /// Replace the queue with the paths read from `source`, one per line.
    ///
    /// Paths that no longer resolve to a playable file are skipped.
    /// Returns the number of tracks loaded.
    pub fn load_persisted<R: BufRead>(&mut self, source: R) -> Result<usize> {
        let mut items = Vec::new();
        for line in source.lines() {
            let line = line.map_err(Error::persistence)?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let track = Track::from_path_with(line, &self.extensions);
            if track.is_audio_file() {
                items.push(track);
            } else {
                tracing::warn!(path = line, "skipping unresolvable queue entry");
            }
        }

        self.items = items;
        self.cursor = if self.items.is_empty() { None } else { Some(0) };
        self.live = false;
        self.autosave();
        tracing::info!(count = self.items.len(), "queue restored");
        Ok(self.items.len())
    }

    /// Write the path sequence to `sink`, one path per line.
    pub fn persist<W: Write>(&self, mut sink: W) -> Result<()> {
        for track in &self.items {
            writeln!(sink, "{}", track.path().display()).map_err(Error::persistence)?;
        }
        sink.flush().map_err(Error::persistence)
    }

    fn push(&mut self, track: Track) -> usize {
        self.items.push(track);
        let index = self.items.len() - 1;
        if self.cursor.is_none() {
            self.cursor = Some(index);
        }
        index
    }

    fn remove_at(&mut self, index: usize) -> Track {
        let track = self.items.remove(index);
        let len = self.items.len();
        if self.cursor == Some(index) {
            self.live = false;
        }
        self.cursor = match self.cursor {
            _ if len == 0 => None,
            Some(c) if c > index => Some(c - 1),
            Some(c) if c == index && c < len => Some(c),
            Some(c) if c == index => {
                if self.loop_mode {
                    Some(0)
                } else {
                    None
                }
            }
            other => other,
        };
        track
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }

    fn autosave(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let mut contents = Vec::new();
        match self.persist(&mut contents) {
            Ok(()) => store.save(contents),
            Err(e) => tracing::warn!(error = %e, "could not snapshot queue"),
        }
    }
}
