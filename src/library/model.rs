use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use lofty::file::AudioFile;

/// File extensions treated as audio when nothing else is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "ogg"];

/// A playable unit (or a directory entry sharing the library tree).
///
/// Immutable once built, except for the duration which is filled in the
/// first time somebody asks for it. Clones share that cache.
#[derive(Clone)]
pub struct Track {
    path: PathBuf,
    name: String,
    is_audio: bool,
    duration: Arc<DurationCache>,
}

#[derive(Debug, Default)]
struct DurationCache {
    /// Reported by the audio engine after decoding.
    reported: OnceLock<Duration>,
    /// Read from the file tags; `None` when they could not be read.
    from_tags: OnceLock<Option<Duration>>,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>, is_audio: bool) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self {
            path,
            name,
            is_audio,
            duration: Arc::default(),
        }
    }

    /// Resolve `path`; it is playable only if it is an existing file with
    /// one of `extensions`.
    pub fn from_path_with(path: impl Into<PathBuf>, extensions: &[String]) -> Self {
        let path = path.into();
        let is_audio = path.is_file() && has_audio_extension(&path, extensions);
        Self::new(path, is_audio)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_audio_file(&self) -> bool {
        self.is_audio
    }

    /// Cached duration, reading the file tags on first access. A value
    /// reported by the engine takes precedence.
    pub fn duration(&self) -> Option<Duration> {
        if !self.is_audio {
            return None;
        }
        if let Some(d) = self.duration.reported.get() {
            return Some(*d);
        }
        *self.duration.from_tags.get_or_init(|| read_tag_duration(&self.path))
    }

    /// Record a duration reported by the audio engine. The first value wins.
    pub fn cache_duration(&self, duration: Duration) {
        let _ = self.duration.reported.set(duration);
    }

    /// The duration if it is already known, without touching the file.
    pub fn cached_duration(&self) -> Option<Duration> {
        self.duration
            .reported
            .get()
            .copied()
            .or_else(|| self.duration.from_tags.get().copied().flatten())
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Track {}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("path", &self.path)
            .field("is_audio", &self.is_audio)
            .finish()
    }
}

/// One row of the library view.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    pub track: Track,
    /// Nesting level below the music directory it was found in.
    pub depth: usize,
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn has_audio_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .any(|e| e == ext)
        })
        .unwrap_or(false)
}

fn read_tag_duration(path: &Path) -> Option<Duration> {
    match lofty::read_from_path(path) {
        Ok(tagged) => Some(tagged.properties().duration()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "could not read duration from tags");
            None
        }
    }
}
