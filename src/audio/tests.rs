use std::path::PathBuf;
use std::time::Duration;

use super::fake::FakeEngine;
use super::*;
use crate::library::Track;

#[test]
fn session_ids_increase() {
    let first = SessionId::default();
    let second = first.next();
    assert!(second > first);
    assert_eq!(second.next(), SessionId(2));
    assert_eq!(second.to_string(), "#1");
}

#[test]
fn failed_load_keeps_the_previous_session() {
    let (mut engine, state) = FakeEngine::new();
    let a = Track::new(PathBuf::from("/music/a.mp3"), true);
    let b = Track::new(PathBuf::from("/music/b.mp3"), true);
    state.borrow_mut().fail_on("/music/b.mp3");

    engine.load(&a, SessionId(1)).unwrap();
    assert!(engine.load(&b, SessionId(2)).is_err());
    assert_eq!(
        state.borrow().finished(),
        FinishedTrack {
            session: SessionId(1),
            path: PathBuf::from("/music/a.mp3"),
        }
    );
}

#[test]
fn fake_seek_never_goes_negative() {
    let (mut engine, _state) = FakeEngine::new();
    engine.seek(5);
    engine.seek(-30);
    assert_eq!(engine.position(), Duration::ZERO);
}
