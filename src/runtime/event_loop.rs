use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::ui;

use super::dispatch::Runtime;

/// Drive the UI until the app asks to quit.
///
/// Each turn drains background events, expires timed popups, redraws and
/// then waits up to 50 ms for input.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    runtime: &mut Runtime,
) -> anyhow::Result<()> {
    loop {
        runtime.drain_events();
        runtime.app.expire(Instant::now());

        terminal.draw(|f| ui::draw(f, &runtime.view()))?;

        if runtime.app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                // Only react to key presses; ignore repeats/releases so one
                // physical press doesn't trigger multiple actions.
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                runtime.handle_key(key);
            }
        }
    }

    Ok(())
}
