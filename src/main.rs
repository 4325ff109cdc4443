use std::process::ExitCode;

use clap::Parser;

mod app;
mod audio;
mod callback;
mod commands;
mod config;
mod error;
mod hooks;
mod keybinds;
mod library;
mod logging;
mod player;
mod queue;
mod runtime;
mod script;
mod ui;

fn main() -> ExitCode {
    let args = runtime::Args::parse();
    match runtime::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lyre: {err:#}");
            ExitCode::FAILURE
        }
    }
}
