//! Per-context key tables consulted before the built-in commands.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use crate::callback::ScriptCallback;
use crate::error::{Error, Result};

mod keys;

pub use keys::*;

#[cfg(test)]
mod tests;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    Playlist,
    Queue,
}

impl KeyContext {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyContext::Global => "global",
            KeyContext::Playlist => "playlist",
            KeyContext::Queue => "queue",
        }
    }
}

impl fmt::Display for KeyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct KeybindRegistry<C> {
    tables: RefCell<HashMap<(KeyContext, KeyDescriptor), C>>,
}

impl<C> Default for KeybindRegistry<C> {
    fn default() -> Self {
        Self {
            tables: RefCell::new(HashMap::new()),
        }
    }
}

impl<C: ScriptCallback> KeybindRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` in `context`, replacing any earlier binding.
    pub fn bind(&self, context: KeyContext, key: KeyDescriptor, callback: C) {
        if self
            .tables
            .borrow_mut()
            .insert((context, key), callback)
            .is_some()
        {
            tracing::debug!(%context, %key, "keybind replaced");
        }
    }

    pub fn exists(&self, context: KeyContext, key: &KeyDescriptor) -> bool {
        self.lookup(context, key).is_some()
    }

    /// Run the callback for `key`: the context's own table first, then
    /// `global`.
    pub fn dispatch(&self, context: KeyContext, key: &KeyDescriptor) -> Result<()> {
        let callback = self
            .lookup(context, key)
            .ok_or_else(|| Error::BindingNotFound {
                context: context.to_string(),
                key: key.to_string(),
            })?;

        // The table borrow is released here so the callback can rebind keys.
        callback.invoke().map_err(|e| {
            tracing::error!(%context, %key, error = %e, "keybind failed");
            match e {
                Error::ScriptExecution(_) => e,
                other => Error::script(other),
            }
        })
    }

    fn lookup(&self, context: KeyContext, key: &KeyDescriptor) -> Option<C> {
        let tables = self.tables.borrow();
        tables
            .get(&(context, *key))
            .or_else(|| tables.get(&(KeyContext::Global, *key)))
            .cloned()
    }
}
