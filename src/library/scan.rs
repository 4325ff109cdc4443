use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use super::model::{LibraryEntry, Track, has_audio_extension};

/// Knobs for [`scan`], derived from `general.*` settings.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Order siblings by modification time (newest first) instead of name.
    pub sort_by_mtime: bool,
    pub follow_links: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: super::DEFAULT_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            sort_by_mtime: false,
            follow_links: true,
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn modified(entry: &DirEntry) -> SystemTime {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Walk every directory in `dirs` and flatten the result into library rows.
///
/// Each music directory contributes itself as a depth-0 directory row,
/// followed by its subdirectories and audio files in walk order. Hidden
/// entries and non-audio files are skipped; missing directories are logged.
pub fn scan(dirs: &[PathBuf], options: &ScanOptions) -> Vec<LibraryEntry> {
    let mut entries = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "music directory does not exist");
            continue;
        }
        scan_dir(dir, options, &mut entries);
    }
    entries
}

fn scan_dir(dir: &Path, options: &ScanOptions, out: &mut Vec<LibraryEntry>) {
    let mut walker = WalkDir::new(dir).follow_links(options.follow_links);
    walker = if options.sort_by_mtime {
        walker.sort_by(|a, b| modified(b).cmp(&modified(a)))
    } else {
        walker.sort_by(|a, b| {
            a.file_name()
                .to_ascii_lowercase()
                .cmp(&b.file_name().to_ascii_lowercase())
        })
    };

    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if entry.file_type().is_dir() {
            out.push(LibraryEntry {
                track: Track::new(path, false),
                depth: entry.depth(),
            });
        } else if has_audio_extension(path, &options.extensions) {
            out.push(LibraryEntry {
                track: Track::new(path, true),
                depth: entry.depth(),
            });
        }
    }
}
