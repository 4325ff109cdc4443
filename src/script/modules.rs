//! `Event`, `Keybinds` and the read-only accessor modules.

use std::rc::Rc;

use mlua::{Function, Lua, LuaSerdeExt, SerializeOptions, Table, Value};

use crate::keybinds::{KeyContext, KeyDescriptor};

use super::host::{HostRequest, HostView, TrackInfo};
use super::Shared;

pub(super) fn install(lua: &Lua, shared: &Rc<Shared>) -> mlua::Result<()> {
    let globals = lua.globals();
    globals.set("Event", event_module(lua, shared)?)?;
    globals.set("Keybinds", keybinds_module(lua, shared)?)?;

    let playlist = lua.create_table()?;
    playlist.set("get_focused", accessor(lua, shared, |v| v.playlist_focused.as_ref())?)?;
    let s = shared.clone();
    playlist.set(
        "focus",
        lua.create_function(move |_, path: String| {
            s.push(HostRequest::FocusPath(path.into()));
            Ok(())
        })?,
    )?;
    globals.set("Playlist", playlist)?;

    let queue = lua.create_table()?;
    queue.set("get_focused", accessor(lua, shared, |v| v.queue_focused.as_ref())?)?;
    globals.set("Queue", queue)?;

    let player = lua.create_table()?;
    player.set("current_audio", accessor(lua, shared, |v| v.now_playing.as_ref())?)?;
    globals.set("Player", player)?;

    Ok(())
}

fn event_module(lua: &Lua, shared: &Rc<Shared>) -> mlua::Result<Table> {
    let event = lua.create_table()?;

    let s = shared.clone();
    event.set(
        "add_hook",
        lua.create_function(move |_, (name, f): (String, Function)| {
            s.hooks.add_hook(&name, f);
            Ok(())
        })?,
    )?;

    let s = shared.clone();
    event.set(
        "run_hooks",
        lua.create_function(move |_, name: String| {
            // Failures are already logged; the count lets scripts react.
            Ok(s.hooks.run_hooks(&name).failures.len())
        })?,
    )?;

    Ok(event)
}

fn keybinds_module(lua: &Lua, shared: &Rc<Shared>) -> mlua::Result<Table> {
    let keybinds = lua.create_table()?;
    for (name, context) in [
        ("def_g", KeyContext::Global),
        ("def_p", KeyContext::Playlist),
        ("def_q", KeyContext::Queue),
    ] {
        let s = shared.clone();
        keybinds.set(
            name,
            lua.create_function(move |_, (key, f): (String, Function)| {
                let key: KeyDescriptor = key.parse().map_err(mlua::Error::external)?;
                s.keybinds.bind(context, key, f);
                Ok(())
            })?,
        )?;
    }
    Ok(keybinds)
}

/// A function returning a by-value copy of one field of the host view.
fn accessor(
    lua: &Lua,
    shared: &Rc<Shared>,
    pick: fn(&HostView) -> Option<&TrackInfo>,
) -> mlua::Result<Function> {
    let s = shared.clone();
    lua.create_function(move |lua, ()| {
        let view = s.view.borrow();
        match pick(&view) {
            Some(info) => lua.to_value_with(info, SerializeOptions::new().serialize_none_to_null(false)),
            None => Ok(Value::Nil),
        }
    })
}
