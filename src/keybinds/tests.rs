use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::*;
use crate::callback::{NativeCallback, native};

fn key(s: &str) -> KeyDescriptor {
    s.parse().unwrap()
}

fn recorder(tag: &'static str, log: &Rc<Cell<&'static str>>) -> NativeCallback {
    let log = log.clone();
    native(move || {
        log.set(tag);
        Ok(())
    })
}

#[test]
fn global_binding_is_visible_from_every_context() {
    let binds: KeybindRegistry<NativeCallback> = KeybindRegistry::new();
    let hit = Rc::new(Cell::new(""));
    binds.bind(KeyContext::Global, key("x"), recorder("global", &hit));

    for ctx in [KeyContext::Global, KeyContext::Playlist, KeyContext::Queue] {
        hit.set("");
        assert!(binds.exists(ctx, &key("x")));
        binds.dispatch(ctx, &key("x")).unwrap();
        assert_eq!(hit.get(), "global");
    }
}

#[test]
fn playlist_binding_is_invisible_from_queue() {
    let binds: KeybindRegistry<NativeCallback> = KeybindRegistry::new();
    let hit = Rc::new(Cell::new(""));
    binds.bind(KeyContext::Playlist, key("y"), recorder("playlist", &hit));

    assert!(!binds.exists(KeyContext::Queue, &key("y")));
    let err = binds.dispatch(KeyContext::Queue, &key("y")).unwrap_err();
    assert!(err.is_binding_miss());
    assert_eq!(
        err,
        Error::BindingNotFound {
            context: "queue".into(),
            key: "y".into()
        }
    );
    assert_eq!(hit.get(), "");
}

#[test]
fn context_binding_shadows_global_and_last_bind_wins() {
    let binds: KeybindRegistry<NativeCallback> = KeybindRegistry::new();
    let hit = Rc::new(Cell::new(""));
    binds.bind(KeyContext::Global, key("a"), recorder("global", &hit));
    binds.bind(KeyContext::Queue, key("a"), recorder("first", &hit));
    binds.bind(KeyContext::Queue, key("a"), recorder("second", &hit));

    binds.dispatch(KeyContext::Queue, &key("a")).unwrap();
    assert_eq!(hit.get(), "second");
    binds.dispatch(KeyContext::Playlist, &key("a")).unwrap();
    assert_eq!(hit.get(), "global");
}

#[test]
fn failing_callback_surfaces_as_script_error() {
    let binds: KeybindRegistry<NativeCallback> = KeybindRegistry::new();
    binds.bind(
        KeyContext::Global,
        key("e"),
        native(|| Err(Error::EmptyQueue)),
    );
    assert!(matches!(
        binds.dispatch(KeyContext::Global, &key("e")),
        Err(Error::ScriptExecution(_))
    ));
}

#[test]
fn callback_can_rebind_its_own_key() {
    let binds: Rc<KeybindRegistry<NativeCallback>> = Rc::new(KeybindRegistry::new());
    let hit = Rc::new(Cell::new(""));
    let weak = Rc::downgrade(&binds);
    let replacement = recorder("replacement", &hit);
    binds.bind(
        KeyContext::Global,
        key("r"),
        native(move || {
            if let Some(b) = weak.upgrade() {
                b.bind(KeyContext::Global, "r".parse().unwrap(), replacement.clone());
            }
            Ok(())
        }),
    );

    binds.dispatch(KeyContext::Global, &key("r")).unwrap();
    assert_eq!(hit.get(), "");
    binds.dispatch(KeyContext::Global, &key("r")).unwrap();
    assert_eq!(hit.get(), "replacement");
}

#[test]
fn descriptors_normalize() {
    assert_eq!(key("Space"), KeyDescriptor::char(' '));
    assert_eq!(key(" "), key("space"));
    assert_eq!(key("ENTER"), key("enter"));
    assert_eq!(key("Ctrl+A"), key("ctrl+a"));
    assert_eq!(key("ctrl+alt+x").to_string(), "Ctrl+Alt+x");
    assert_eq!(key("+"), KeyDescriptor::char('+'));
    assert_eq!(key("Ctrl++").to_string(), "Ctrl++");
    assert_eq!(key("f5").to_string(), "F5");
    assert_eq!(key("PageDown").to_string(), "PageDown");
    assert_ne!(key("J"), key("j"));

    assert!("".parse::<KeyDescriptor>().is_err());
    assert!("F13".parse::<KeyDescriptor>().is_err());
    assert!("Hyper".parse::<KeyDescriptor>().is_err());
}

#[test]
fn descriptors_convert_from_terminal_events() {
    let ev = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
    assert_eq!(KeyDescriptor::from_event(&ev), Some(key("q")));

    let ev = KeyEvent::new(KeyCode::Char('N'), KeyModifiers::SHIFT);
    assert_eq!(KeyDescriptor::from_event(&ev), Some(key("N")));

    let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(KeyDescriptor::from_event(&ev), Some(key("Ctrl+c")));

    let ev = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
    assert_eq!(KeyDescriptor::from_event(&ev), Some(key("Space")));

    let ev = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
    assert_eq!(KeyDescriptor::from_event(&ev), Some(key("Alt+Enter")));

    let ev = KeyEvent::new(KeyCode::CapsLock, KeyModifiers::NONE);
    assert_eq!(KeyDescriptor::from_event(&ev), None);
}
