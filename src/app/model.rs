//! Application model types: `App` and `Panel`.
//!
//! The `App` struct holds the library listing, per-panel selection, the
//! popup stack and the transient notification shown in the status bar.

use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;

use crate::keybinds::KeyContext;
use crate::library::LibraryEntry;

use super::popup::{Popup, PopupOutcome};

/// How long a notification stays in the status bar.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Playlist,
    Queue,
}

impl Panel {
    pub fn context(self) -> KeyContext {
        match self {
            Panel::Playlist => KeyContext::Playlist,
            Panel::Queue => KeyContext::Queue,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub text: String,
    pub is_error: bool,
    pub expires: Instant,
}

/// The main application model.
#[derive(Debug, Default)]
pub struct App {
    pub entries: Vec<LibraryEntry>,
    pub playlist_selected: usize,
    pub queue_selected: usize,
    pub focus: Panel,
    pub popups: Vec<Popup>,
    pub notification: Option<Notification>,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    /// Create a new `App` listing `entries`.
    pub fn new(entries: Vec<LibraryEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Keybind context of the focused panel.
    pub fn context(&self) -> KeyContext {
        self.focus.context()
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            Panel::Playlist => Panel::Queue,
            Panel::Queue => Panel::Playlist,
        };
    }

    pub fn selected_entry(&self) -> Option<&LibraryEntry> {
        self.entries.get(self.playlist_selected)
    }

    /// Move the focused panel's selection down, wrapping around.
    pub fn select_next(&mut self, queue_len: usize) {
        match self.focus {
            Panel::Playlist => {
                self.playlist_selected = wrap_next(self.playlist_selected, self.entries.len())
            }
            Panel::Queue => self.queue_selected = wrap_next(self.queue_selected, queue_len),
        }
    }

    /// Move the focused panel's selection up, wrapping around.
    pub fn select_prev(&mut self, queue_len: usize) {
        match self.focus {
            Panel::Playlist => {
                self.playlist_selected = wrap_prev(self.playlist_selected, self.entries.len())
            }
            Panel::Queue => self.queue_selected = wrap_prev(self.queue_selected, queue_len),
        }
    }

    /// Keep the queue selection inside a queue of `len` items.
    pub fn clamp_queue_selection(&mut self, len: usize) {
        self.queue_selected = self.queue_selected.min(len.saturating_sub(1));
    }

    /// Highlight the playlist row for `path`. Returns false when it is not
    /// listed.
    pub fn focus_path(&mut self, path: &Path) -> bool {
        match self.entries.iter().position(|e| e.track.path() == path) {
            Some(i) => {
                self.playlist_selected = i;
                self.focus = Panel::Playlist;
                true
            }
            None => false,
        }
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.set_notification(text.into(), false);
    }

    pub fn notify_error(&mut self, text: impl Into<String>) {
        self.set_notification(text.into(), true);
    }

    fn set_notification(&mut self, text: String, is_error: bool) {
        self.notification = Some(Notification {
            text,
            is_error,
            expires: Instant::now() + NOTIFICATION_TTL,
        });
    }

    pub fn push_popup(&mut self, popup: Popup) {
        self.popups.push(popup);
    }

    pub fn has_popup(&self) -> bool {
        !self.popups.is_empty()
    }

    /// Feed `key` to the front popup. `None` when no popup is open.
    pub fn handle_popup_key(&mut self, key: &KeyEvent) -> Option<PopupOutcome> {
        let outcome = self.popups.last_mut()?.handle_key(key);
        if outcome != PopupOutcome::Pending {
            self.popups.pop();
        }
        Some(outcome)
    }

    /// Drop timed popups and the notification once they are due.
    pub fn expire(&mut self, now: Instant) {
        self.popups.retain(|p| !p.is_expired(now));
        if self.notification.as_ref().is_some_and(|n| n.expires <= now) {
            self.notification = None;
        }
    }
}

fn wrap_next(current: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (current + 1) % len }
}

fn wrap_prev(current: usize, len: usize) -> usize {
    match len {
        0 => 0,
        _ if current == 0 || current >= len => len - 1,
        _ => current - 1,
    }
}
