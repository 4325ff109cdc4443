//! Popup stack entries and their key handling.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::script::CallbackId;

/// Who receives the item picked in a search popup.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchTarget {
    Script(CallbackId),
    /// The built-in command palette.
    Commands,
    /// Yes/no prompt shown before quitting when `confirm_on_exit` is set.
    ConfirmQuit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Popup {
    /// Info, debug and timed popups. Timed ones carry an expiry.
    Message {
        title: String,
        text: String,
        expires: Option<Instant>,
    },
    Input {
        prompt: String,
        buffer: String,
        callback: CallbackId,
    },
    Search {
        title: String,
        items: Vec<String>,
        query: String,
        selected: usize,
        target: SearchTarget,
    },
}

/// Result of feeding a key to the front popup.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupOutcome {
    /// The popup consumed the key and stays open.
    Pending,
    Dismissed(Popup),
    /// The popup closed with a value (input text or picked item).
    Submitted(Popup, String),
}

impl Popup {
    pub fn message(title: impl Into<String>, text: impl Into<String>) -> Self {
        Popup::Message {
            title: title.into(),
            text: text.into(),
            expires: None,
        }
    }

    pub fn search(title: impl Into<String>, items: Vec<String>, target: SearchTarget) -> Self {
        Popup::Search {
            title: title.into(),
            items,
            query: String::new(),
            selected: 0,
            target,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self, Popup::Message { expires: Some(at), .. } if *at <= now)
    }

    /// Items matching the search query, with the matched char positions.
    pub fn matches(&self) -> Vec<(usize, Vec<usize>)> {
        let Popup::Search { items, query, .. } = self else {
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| fuzzy_match_positions(item, query).map(|pos| (i, pos)))
            .collect()
    }

    /// The caller pops the popup on any outcome other than `Pending`.
    pub(super) fn handle_key(&mut self, key: &KeyEvent) -> PopupOutcome {
        if key.code == KeyCode::Esc {
            return PopupOutcome::Dismissed(self.clone());
        }

        let matches = self.matches();
        match self {
            Popup::Message { .. } => match key.code {
                KeyCode::Enter | KeyCode::Char('q') => PopupOutcome::Dismissed(self.clone()),
                _ => PopupOutcome::Pending,
            },
            Popup::Input { buffer, .. } => match key.code {
                KeyCode::Enter => {
                    let value = buffer.clone();
                    PopupOutcome::Submitted(self.clone(), value)
                }
                KeyCode::Backspace => {
                    buffer.pop();
                    PopupOutcome::Pending
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    PopupOutcome::Pending
                }
                _ => PopupOutcome::Pending,
            },
            Popup::Search {
                items,
                query,
                selected,
                ..
            } => match key.code {
                KeyCode::Enter => match matches.get(*selected) {
                    Some((i, _)) => {
                        let value = items[*i].clone();
                        PopupOutcome::Submitted(self.clone(), value)
                    }
                    None => PopupOutcome::Pending,
                },
                KeyCode::Down | KeyCode::Tab => {
                    if !matches.is_empty() {
                        *selected = (*selected + 1) % matches.len();
                    }
                    PopupOutcome::Pending
                }
                KeyCode::Up | KeyCode::BackTab => {
                    if !matches.is_empty() {
                        *selected = (*selected + matches.len() - 1) % matches.len();
                    }
                    PopupOutcome::Pending
                }
                KeyCode::Backspace => {
                    query.pop();
                    *selected = 0;
                    PopupOutcome::Pending
                }
                KeyCode::Char(c) => {
                    query.push(c);
                    *selected = 0;
                    PopupOutcome::Pending
                }
                _ => PopupOutcome::Pending,
            },
        }
    }
}

/// Fuzzy/subsequence match: return the character positions in `title`
/// that match `query`, or `None` if not matched.
pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
    if query.is_empty() {
        return Some(Vec::new());
    }

    let mut positions: Vec<usize> = Vec::new();
    let mut title_iter = title.chars().enumerate();

    for qc in query.chars() {
        let qc_low = qc.to_ascii_lowercase();
        loop {
            match title_iter.next() {
                Some((ti, tc)) if tc.to_ascii_lowercase() == qc_low => {
                    positions.push(ti);
                    break;
                }
                Some(_) => continue,
                None => return None,
            }
        }
    }

    Some(positions)
}
