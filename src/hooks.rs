//! Named lifecycle hooks.
//!
//! Callbacks are run synchronously in registration order. A failing
//! callback is logged and reported but never stops the ones after it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use crate::callback::ScriptCallback;
use crate::error::Error;

#[cfg(test)]
mod tests;

/// Lifecycle events fired by the player and the runtime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HookEvent {
    /// Startup finished; fired once.
    Enter,
    /// A new track was loaded for playback.
    NewSong,
    Skip,
    Play,
    Pause,
    Exit,
}

impl HookEvent {
    #[cfg(test)]
    pub const ALL: [HookEvent; 6] = [
        HookEvent::Enter,
        HookEvent::NewSong,
        HookEvent::Skip,
        HookEvent::Play,
        HookEvent::Pause,
        HookEvent::Exit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HookEvent::Enter => "enter",
            HookEvent::NewSong => "new_song",
            HookEvent::Skip => "skip",
            HookEvent::Play => "play",
            HookEvent::Pause => "pause",
            HookEvent::Exit => "exit",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one `run_hooks` call.
#[derive(Debug, Default)]
pub struct HookReport {
    pub ran: usize,
    pub failures: Vec<Error>,
}

impl HookReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Default)]
struct Firing {
    /// Nested firings of this event waiting for the outer one.
    deferred: usize,
}

pub struct HookRegistry<C> {
    hooks: RefCell<HashMap<String, Vec<C>>>,
    firing: RefCell<HashMap<String, Firing>>,
}

impl<C> Default for HookRegistry<C> {
    fn default() -> Self {
        Self {
            hooks: RefCell::new(HashMap::new()),
            firing: RefCell::new(HashMap::new()),
        }
    }
}

impl<C: ScriptCallback> HookRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hook(&self, event: &str, callback: C) {
        self.hooks
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(callback);
    }

    #[cfg(test)]
    pub fn count(&self, event: &str) -> usize {
        self.hooks.borrow().get(event).map_or(0, Vec::len)
    }

    /// Run every callback registered for `event`.
    ///
    /// Firing an event from inside one of its own callbacks is deferred
    /// until the outer firing completes; the deferred run's results are
    /// folded into the outer report.
    pub fn run_hooks(&self, event: &str) -> HookReport {
        {
            let mut firing = self.firing.borrow_mut();
            if let Some(state) = firing.get_mut(event) {
                state.deferred += 1;
                tracing::debug!(event, "nested hook firing deferred");
                return HookReport::default();
            }
            firing.insert(event.to_string(), Firing::default());
        }

        let mut report = HookReport::default();
        loop {
            // Snapshot so callbacks may register new hooks while running.
            let callbacks = self.hooks.borrow().get(event).cloned().unwrap_or_default();
            for cb in callbacks {
                report.ran += 1;
                if let Err(e) = cb.invoke() {
                    tracing::error!(event, error = %e, "hook failed");
                    report.failures.push(e);
                }
            }

            let mut firing = self.firing.borrow_mut();
            match firing.get_mut(event) {
                Some(state) if state.deferred > 0 => state.deferred -= 1,
                _ => {
                    firing.remove(event);
                    break;
                }
            }
        }
        report
    }

    pub fn fire(&self, event: HookEvent) -> HookReport {
        self.run_hooks(event.as_str())
    }
}
