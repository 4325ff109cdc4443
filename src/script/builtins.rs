//! Global functions: popups, shell and one function per command.

use std::rc::Rc;

use mlua::{Function, Lua};

use crate::commands::Command;

use super::host::HostRequest;
use super::Shared;

pub(super) fn install(lua: &Lua, shared: &Rc<Shared>) -> mlua::Result<()> {
    let globals = lua.globals();

    let s = shared.clone();
    globals.set(
        "info_popup",
        lua.create_function(move |_, (title, text): (String, Option<String>)| {
            let (title, text) = titled(title, text, "Info");
            s.push(HostRequest::Info { title, text });
            Ok(())
        })?,
    )?;

    let s = shared.clone();
    globals.set(
        "show_popup",
        lua.create_function(move |_, (title, text): (String, Option<String>)| {
            let (title, text) = titled(title, text, "");
            s.push(HostRequest::Timed { title, text });
            Ok(())
        })?,
    )?;

    let s = shared.clone();
    globals.set(
        "debug_popup",
        lua.create_function(move |_, text: String| {
            s.push(HostRequest::Debug { text });
            Ok(())
        })?,
    )?;

    let s = shared.clone();
    globals.set(
        "input_popup",
        lua.create_function(move |_, (prompt, cb): (String, Function)| {
            let callback = s.park(cb);
            s.push(HostRequest::Input { prompt, callback });
            Ok(())
        })?,
    )?;

    let s = shared.clone();
    globals.set(
        "search_popup",
        lua.create_function(
            move |_, (title, items, cb): (String, Vec<String>, Function)| {
                let callback = s.park(cb);
                s.push(HostRequest::Search {
                    title,
                    items,
                    callback,
                });
                Ok(())
            },
        )?,
    )?;

    let s = shared.clone();
    globals.set(
        "shell",
        lua.create_function(move |_, (command, cb): (String, Option<Function>)| {
            let callback = cb.map(|f| s.park(f));
            s.push(HostRequest::Shell { command, callback });
            Ok(())
        })?,
    )?;

    for cmd in Command::all() {
        let s = shared.clone();
        globals.set(
            cmd.name(),
            lua.create_function(move |_, ()| {
                s.push(HostRequest::Command(cmd));
                Ok(())
            })?,
        )?;
    }

    Ok(())
}

/// `f(text)` or `f(title, text)`.
fn titled(first: String, second: Option<String>, default_title: &str) -> (String, String) {
    match second {
        Some(text) => (first, text),
        None => (default_title.to_string(), first),
    }
}
