use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;
use crate::callback::{NativeCallback, native};

fn counter() -> (Rc<Cell<usize>>, NativeCallback) {
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    (
        hits,
        native(move || {
            h.set(h.get() + 1);
            Ok(())
        }),
    )
}

#[test]
fn firing_an_event_with_no_hooks_is_a_no_op() {
    let hooks: HookRegistry<NativeCallback> = HookRegistry::new();
    let report = hooks.run_hooks("new_song");
    assert_eq!(report.ran, 0);
    assert!(report.is_ok());
    assert_eq!(hooks.run_hooks("no_such_event").ran, 0);
}

#[test]
fn callbacks_run_in_registration_order() {
    let hooks: HookRegistry<NativeCallback> = HookRegistry::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    for n in 0..3 {
        let order = order.clone();
        hooks.add_hook("play", native(move || {
            order.borrow_mut().push(n);
            Ok(())
        }));
    }
    assert_eq!(hooks.fire(HookEvent::Play).ran, 3);
    assert_eq!(*order.borrow(), vec![0, 1, 2]);
}

#[test]
fn one_failing_callback_does_not_stop_the_rest() {
    let hooks: HookRegistry<NativeCallback> = HookRegistry::new();
    let (hits, ok) = counter();
    hooks.add_hook("skip", ok.clone());
    hooks.add_hook("skip", native(|| Err(Error::script("boom"))));
    hooks.add_hook("skip", ok);

    let report = hooks.fire(HookEvent::Skip);
    assert_eq!(report.ran, 3);
    assert_eq!(hits.get(), 2);
    assert_eq!(report.failures, vec![Error::ScriptExecution("boom".into())]);
}

#[test]
fn nested_firing_of_the_same_event_is_deferred() {
    let hooks: Rc<HookRegistry<NativeCallback>> = Rc::new(HookRegistry::new());
    let log = Rc::new(RefCell::new(Vec::new()));
    let depth = Rc::new(Cell::new(0));

    let (h, l, d) = (Rc::downgrade(&hooks), log.clone(), depth.clone());
    hooks.add_hook("pause", native(move || {
        l.borrow_mut().push(format!("start {}", d.get()));
        d.set(d.get() + 1);
        if l.borrow().len() == 1 {
            if let Some(h) = h.upgrade() {
                // Deferred: returns immediately without running anything.
                assert_eq!(h.run_hooks("pause").ran, 0);
            }
        }
        l.borrow_mut().push("end".to_string());
        Ok(())
    }));

    let report = hooks.fire(HookEvent::Pause);
    assert_eq!(report.ran, 2);
    assert_eq!(*log.borrow(), vec!["start 0", "end", "start 1", "end"]);
}

#[test]
fn different_event_fired_from_a_callback_runs_immediately() {
    let hooks: Rc<HookRegistry<NativeCallback>> = Rc::new(HookRegistry::new());
    let (hits, ok) = counter();
    hooks.add_hook("new_song", ok);

    let h = Rc::downgrade(&hooks);
    let inner_ran = Rc::new(Cell::new(0));
    let ir = inner_ran.clone();
    hooks.add_hook("skip", native(move || {
        if let Some(h) = h.upgrade() {
            ir.set(h.fire(HookEvent::NewSong).ran);
        }
        Ok(())
    }));

    hooks.fire(HookEvent::Skip);
    assert_eq!(inner_ran.get(), 1);
    assert_eq!(hits.get(), 1);
}

#[test]
fn hooks_added_while_firing_run_next_time() {
    let hooks: Rc<HookRegistry<NativeCallback>> = Rc::new(HookRegistry::new());
    let (hits, ok) = counter();
    let h = Rc::downgrade(&hooks);
    hooks.add_hook("enter", native(move || {
        if let Some(h) = h.upgrade() {
            h.add_hook("enter", ok.clone());
        }
        Ok(())
    }));

    hooks.fire(HookEvent::Enter);
    assert_eq!(hits.get(), 0);
    assert_eq!(hooks.count("enter"), 2);
    hooks.fire(HookEvent::Enter);
    assert_eq!(hits.get(), 1);
}

#[test]
fn event_names_match_the_script_vocabulary() {
    let names: Vec<_> = HookEvent::ALL.iter().map(|e| e.as_str()).collect();
    assert_eq!(names, ["enter", "new_song", "skip", "play", "pause", "exit"]);
}
