//! Embedded Lua environment.
//!
//! One `Lua` state lives for the whole process. The built-in defaults and
//! the user's configuration execute into the same global scope, and every
//! hook and keybind callback runs against it on the event loop thread.
//!
//! Host functions exposed to scripts never touch the player or the queue
//! directly: they queue a [`HostRequest`] that the loop executes after the
//! current dispatch returns.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use mlua::{DeserializeOptions, Function, IntoLuaMulti, Lua, LuaSerdeExt, Value};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::hooks::{HookEvent, HookRegistry, HookReport};
use crate::keybinds::{KeyContext, KeyDescriptor, KeybindRegistry};

mod builtins;
mod defaults;
mod host;
mod modules;

pub use defaults::{DEFAULT_CONFIG, USER_TEMPLATE};
pub use host::*;

#[cfg(test)]
mod tests;

/// State shared between the environment and the host functions it
/// installs into Lua.
#[derive(Default)]
struct Shared {
    requests: RefCell<VecDeque<HostRequest>>,
    view: RefCell<HostView>,
    callbacks: RefCell<HashMap<CallbackId, Function>>,
    next_callback: Cell<u64>,
    hooks: HookRegistry<Function>,
    keybinds: KeybindRegistry<Function>,
}

impl Shared {
    fn push(&self, request: HostRequest) {
        self.requests.borrow_mut().push_back(request);
    }

    /// Keep `f` until the loop calls back with a result.
    fn park(&self, f: Function) -> CallbackId {
        let id = CallbackId(self.next_callback.get());
        self.next_callback.set(id.0 + 1);
        self.callbacks.borrow_mut().insert(id, f);
        id
    }
}

pub struct ScriptEnv {
    lua: Lua,
    shared: Rc<Shared>,
}

impl ScriptEnv {
    pub fn new() -> Result<Self> {
        let lua = Lua::new();
        let shared = Rc::new(Shared::default());

        builtins::install(&lua, &shared)?;
        modules::install(&lua, &shared)?;
        lua.load(defaults::PRELUDE).set_name("prelude").exec()?;

        Ok(Self { lua, shared })
    }

    /// Run the built-in configuration. Failure is fatal to startup.
    pub fn exec_default(&self, src: &str) -> Result<()> {
        self.lua
            .load(src)
            .set_name("default config")
            .exec()
            .map_err(Error::from)
    }

    /// Run user-supplied source. Failure is logged and returned; anything
    /// the source defined before failing stays defined.
    pub fn exec_user(&self, src: &str, name: &str) -> Result<()> {
        self.lua.load(src).set_name(name).exec().map_err(|e| {
            tracing::error!(source = name, error = %e, "user script failed");
            Error::from(e)
        })
    }

    /// Read the `general`, `emoji` and `color` tables as typed settings.
    pub fn settings(&self) -> Result<Settings> {
        let globals = self.lua.globals();
        let root = self.lua.create_table()?;
        for key in ["general", "emoji", "color"] {
            let value: Value = globals.get(key)?;
            root.set(key, value)?;
        }
        let options = DeserializeOptions::new().deny_unsupported_types(false);
        Ok(self.lua.from_value_with(Value::Table(root), options)?)
    }

    pub fn fire(&self, event: HookEvent) -> HookReport {
        self.shared.hooks.fire(event)
    }

    pub fn has_binding(&self, context: KeyContext, key: &KeyDescriptor) -> bool {
        self.shared.keybinds.exists(context, key)
    }

    pub fn dispatch_key(&self, context: KeyContext, key: &KeyDescriptor) -> Result<()> {
        self.shared.keybinds.dispatch(context, key)
    }

    /// Next queued request, oldest first.
    pub fn next_request(&self) -> Option<HostRequest> {
        self.shared.requests.borrow_mut().pop_front()
    }

    #[cfg(test)]
    pub fn pending_requests(&self) -> usize {
        self.shared.requests.borrow().len()
    }

    /// Drop queued requests, returning how many were discarded.
    pub fn discard_requests(&self) -> usize {
        let mut requests = self.shared.requests.borrow_mut();
        let n = requests.len();
        requests.clear();
        n
    }

    pub fn set_view(&self, view: HostView) {
        *self.shared.view.borrow_mut() = view;
    }

    /// Call the parked callback `id` once with `args`.
    pub fn run_callback(&self, id: CallbackId, args: impl IntoLuaMulti) -> Result<()> {
        let Some(f) = self.shared.callbacks.borrow_mut().remove(&id) else {
            tracing::debug!(?id, "callback already consumed");
            return Ok(());
        };
        f.call::<()>(args).map_err(|e| {
            tracing::error!(error = %e, "script callback failed");
            Error::from(e)
        })
    }

    /// Forget a parked callback without calling it (popup dismissed).
    pub fn drop_callback(&self, id: CallbackId) {
        self.shared.callbacks.borrow_mut().remove(&id);
    }
}
