use super::*;
use crate::keybinds::KeyContext;
use crate::library::{LibraryEntry, Track};
use crate::script::CallbackId;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn entry(path: &str) -> LibraryEntry {
    LibraryEntry {
        track: Track::new(PathBuf::from(path), true),
        depth: 1,
    }
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
        assert_eq!(
            app.handle_popup_key(&press(KeyCode::Char(c))),
            Some(PopupOutcome::Pending)
        );
    }
}

#[test]
fn fuzzy_match_simple() {
    let title = "Hello World";
    assert_eq!(fuzzy_match_positions(title, "hw"), Some(vec![0, 6]));
    assert!(fuzzy_match_positions(title, "ello").is_some());
    assert!(fuzzy_match_positions(title, "xyz").is_none());
}

#[test]
fn focus_cycles_and_maps_to_key_context() {
    let mut app = App::new(Vec::new());
    assert_eq!(app.context(), KeyContext::Playlist);
    app.focus_next();
    assert_eq!(app.context(), KeyContext::Queue);
    app.focus_next();
    assert_eq!(app.focus, Panel::Playlist);
}

#[test]
fn selection_wraps_per_panel() {
    let mut app = App::new(vec![entry("/m/a.mp3"), entry("/m/b.mp3")]);
    app.select_prev(0);
    assert_eq!(app.playlist_selected, 1);
    app.select_next(0);
    assert_eq!(app.playlist_selected, 0);

    app.focus = Panel::Queue;
    app.select_next(3);
    app.select_next(3);
    app.select_next(3);
    assert_eq!(app.queue_selected, 0);
    app.select_next(0);
    assert_eq!(app.queue_selected, 0);
    assert_eq!(app.playlist_selected, 0);

    app.queue_selected = 5;
    app.clamp_queue_selection(2);
    assert_eq!(app.queue_selected, 1);
}

#[test]
fn focus_path_moves_playlist_highlight() {
    let mut app = App::new(vec![entry("/m/a.mp3"), entry("/m/b.mp3")]);
    app.focus = Panel::Queue;
    assert!(app.focus_path(std::path::Path::new("/m/b.mp3")));
    assert_eq!(app.playlist_selected, 1);
    assert_eq!(app.focus, Panel::Playlist);
    assert!(!app.focus_path(std::path::Path::new("/m/zzz.mp3")));
}

#[test]
fn input_popup_submits_typed_text() {
    let mut app = App::new(Vec::new());
    assert_eq!(app.handle_popup_key(&press(KeyCode::Enter)), None);

    app.push_popup(Popup::Input {
        prompt: "Name?".into(),
        buffer: String::new(),
        callback: CallbackId(7),
    });
    type_str(&mut app, "abx");
    app.handle_popup_key(&press(KeyCode::Backspace));
    type_str(&mut app, "c");

    match app.handle_popup_key(&press(KeyCode::Enter)) {
        Some(PopupOutcome::Submitted(Popup::Input { callback, .. }, value)) => {
            assert_eq!(callback, CallbackId(7));
            assert_eq!(value, "abc");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(!app.has_popup());
}

#[test]
fn search_popup_filters_and_picks() {
    let mut app = App::new(Vec::new());
    let items = vec!["skip".to_string(), "shuffle_queue".to_string(), "quit".to_string()];
    app.push_popup(Popup::search("Commands", items, SearchTarget::Commands));

    type_str(&mut app, "s");
    assert_eq!(app.popups[0].matches().len(), 2);
    app.handle_popup_key(&press(KeyCode::Down));

    match app.handle_popup_key(&press(KeyCode::Enter)) {
        Some(PopupOutcome::Submitted(Popup::Search { target, .. }, value)) => {
            assert_eq!(target, SearchTarget::Commands);
            assert_eq!(value, "shuffle_queue");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn escape_dismisses_the_front_popup_only() {
    let mut app = App::new(Vec::new());
    app.push_popup(Popup::message("a", "first"));
    app.push_popup(Popup::message("b", "second"));
    assert!(matches!(
        app.handle_popup_key(&press(KeyCode::Esc)),
        Some(PopupOutcome::Dismissed(Popup::Message { .. }))
    ));
    assert_eq!(app.popups, vec![Popup::message("a", "first")]);
}

#[test]
fn timed_popups_and_notifications_expire() {
    let mut app = App::new(Vec::new());
    let now = Instant::now();
    app.push_popup(Popup::Message {
        title: "t".into(),
        text: "soon gone".into(),
        expires: Some(now + Duration::from_secs(1)),
    });
    app.push_popup(Popup::message("i", "sticky"));
    app.notify_error("failed");

    app.expire(now);
    assert_eq!(app.popups.len(), 2);
    assert!(app.notification.as_ref().unwrap().is_error);

    app.expire(now + Duration::from_secs(10));
    assert_eq!(app.popups, vec![Popup::message("i", "sticky")]);
    assert!(app.notification.is_none());
}
