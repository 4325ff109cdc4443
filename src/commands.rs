//! Built-in commands and their default keys.
//!
//! A command is invocable from a key press (after script keybinds had
//! their chance), from the command search popup, or from a script through
//! the global function of the same name.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::keybinds::{Key, KeyContext, KeyDescriptor};

#[cfg(test)]
mod tests;

/// Seconds moved by `forward`/`rewind`.
pub const SEEK_STEP: i64 = 10;
/// Seconds moved by `forward_fast`/`rewind_fast`.
pub const SEEK_STEP_FAST: i64 = 60;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    Quit,
    TogglePause,
    Skip,
    Forward,
    ForwardFast,
    Rewind,
    RewindFast,
    VolumeUp,
    VolumeDown,
    ToggleLoop,
    ShuffleQueue,
    ClearQueue,
    ToggleHelp,
    CommandSearch,
    PlaySelected,
    EnqueueSelected,
    DeleteItem,
    MoveUp,
    MoveDown,
    ReorderUp,
    ReorderDown,
    FocusNextPanel,
}

const TABLE: &[(Command, &str, &str)] = &[
    (Command::Quit, "quit", "Quit"),
    (Command::TogglePause, "toggle_pause", "Play or pause"),
    (Command::Skip, "skip", "Skip to the next track"),
    (Command::Forward, "forward", "Seek forward 10s"),
    (Command::ForwardFast, "forward_fast", "Seek forward 60s"),
    (Command::Rewind, "rewind", "Seek back 10s"),
    (Command::RewindFast, "rewind_fast", "Seek back 60s"),
    (Command::VolumeUp, "volume_up", "Volume up"),
    (Command::VolumeDown, "volume_down", "Volume down"),
    (Command::ToggleLoop, "toggle_loop", "Toggle queue loop"),
    (Command::ShuffleQueue, "shuffle_queue", "Shuffle the queue"),
    (Command::ClearQueue, "clear_queue", "Clear the queue"),
    (Command::ToggleHelp, "toggle_help", "Show or hide help"),
    (Command::CommandSearch, "command_search", "Search commands"),
    (Command::PlaySelected, "play_selected", "Play the selected queue item"),
    (Command::EnqueueSelected, "enqueue_selected", "Add the selected file to the queue"),
    (Command::DeleteItem, "delete_item", "Remove the selected queue item"),
    (Command::MoveUp, "move_up", "Select previous"),
    (Command::MoveDown, "move_down", "Select next"),
    (Command::ReorderUp, "reorder_up", "Move queue item up"),
    (Command::ReorderDown, "reorder_down", "Move queue item down"),
    (Command::FocusNextPanel, "focus_next_panel", "Focus the next panel"),
];

impl Command {
    pub fn all() -> impl Iterator<Item = Command> {
        TABLE.iter().map(|(c, _, _)| *c)
    }

    fn entry(self) -> &'static (Command, &'static str, &'static str) {
        // Every variant has a row in TABLE.
        TABLE
            .iter()
            .find(|(c, _, _)| *c == self)
            .unwrap_or(&TABLE[0])
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn description(self) -> &'static str {
        self.entry().2
    }

    pub fn seek_delta(self) -> Option<i64> {
        match self {
            Command::Forward => Some(SEEK_STEP),
            Command::ForwardFast => Some(SEEK_STEP_FAST),
            Command::Rewind => Some(-SEEK_STEP),
            Command::RewindFast => Some(-SEEK_STEP_FAST),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TABLE
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(c, _, _)| *c)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

/// Default key to command tables, consulted after script keybinds.
pub struct CommandRegistry {
    keys: HashMap<(KeyContext, KeyDescriptor), Command>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl CommandRegistry {
    pub fn empty() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        use Command::*;
        use KeyContext::{Global, Playlist, Queue};

        let mut reg = Self::empty();
        for (c, cmd) in [
            ('q', Quit),
            (' ', TogglePause),
            ('+', VolumeUp),
            ('=', VolumeUp),
            ('-', VolumeDown),
            ('_', VolumeDown),
            ('n', Skip),
            (':', CommandSearch),
            ('?', ToggleHelp),
            ('f', Forward),
            ('F', ForwardFast),
            ('b', Rewind),
            ('B', RewindFast),
        ] {
            reg.bind(Global, KeyDescriptor::char(c), cmd);
        }
        reg.bind(Global, Key::Tab.into(), FocusNextPanel);

        for ctx in [Playlist, Queue] {
            reg.bind(ctx, KeyDescriptor::char('j'), MoveDown);
            reg.bind(ctx, KeyDescriptor::char('k'), MoveUp);
            reg.bind(ctx, Key::Down.into(), MoveDown);
            reg.bind(ctx, Key::Up.into(), MoveUp);
        }

        reg.bind(Playlist, KeyDescriptor::char('l'), EnqueueSelected);
        reg.bind(Playlist, Key::Enter.into(), EnqueueSelected);

        reg.bind(Queue, Key::Enter.into(), PlaySelected);
        reg.bind(Queue, KeyDescriptor::char('d'), DeleteItem);
        reg.bind(Queue, KeyDescriptor::char('D'), ClearQueue);
        reg.bind(Queue, KeyDescriptor::char('J'), ReorderDown);
        reg.bind(Queue, KeyDescriptor::char('K'), ReorderUp);
        reg.bind(Queue, KeyDescriptor::char('s'), ShuffleQueue);
        reg.bind(Queue, KeyDescriptor::char('z'), ToggleLoop);
        reg
    }

    pub fn bind(&mut self, context: KeyContext, key: KeyDescriptor, command: Command) {
        self.keys.insert((context, key), command);
    }

    /// The command for `key` in `context`, falling back to `global`.
    pub fn lookup(&self, context: KeyContext, key: &KeyDescriptor) -> Option<Command> {
        self.keys
            .get(&(context, *key))
            .or_else(|| self.keys.get(&(KeyContext::Global, *key)))
            .copied()
    }

    /// `(context, key, command)` rows sorted for the help screen.
    pub fn bindings(&self) -> Vec<(KeyContext, KeyDescriptor, Command)> {
        let mut rows: Vec<_> = self
            .keys
            .iter()
            .map(|((ctx, key), cmd)| (*ctx, *key, *cmd))
            .collect();
        rows.sort_by_key(|(ctx, key, _)| (ctx.as_str(), key.to_string()));
        rows
    }
}
