use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::audio::RodioEngine;
use crate::config;
use crate::logging;

mod dispatch;
mod event_loop;
mod startup;
mod worker;

use startup::{StartupOptions, bootstrap};

#[derive(Debug, Parser)]
#[command(name = "lyre", version, about = "A scriptable terminal music player")]
pub struct Args {
    /// Lua configuration file (defaults to $LYRE_CONFIG_PATH, then
    /// $XDG_CONFIG_HOME/lyre/config.lua).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Start with an empty queue; the saved queue is left untouched.
    #[arg(short, long)]
    pub empty: bool,

    /// Music directory to browse instead of general.music_dirs.
    #[arg(short, long, value_name = "DIR")]
    pub music: Option<PathBuf>,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let data_dir = config::data_dir().context("cannot locate a data directory; is $HOME set?")?;
    let _log_guard = logging::init(&data_dir).context("failed to set up logging")?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting lyre");

    let opts = StartupOptions {
        config_path: config::resolve_config_path(args.config.as_deref()),
        queue_path: config::queue_path(),
        music_dir: args.music,
        empty: args.empty,
    };

    let engine = RodioEngine::spawn().context("failed to open the audio output")?;
    let mut runtime = bootstrap(&opts, Box::new(engine))?;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &mut runtime);
    runtime.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
