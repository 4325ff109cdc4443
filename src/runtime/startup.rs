use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::app::App;
use crate::audio::AudioEngine;
use crate::config::{self, GeneralSettings, Settings};
use crate::hooks::HookEvent;
use crate::library::{self, ScanOptions};
use crate::queue::{PlaybackQueue, QueueStore};
use crate::script::{DEFAULT_CONFIG, ScriptEnv, USER_TEMPLATE};

use super::dispatch::Runtime;

/// Resolved inputs for [`bootstrap`].
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// User configuration script; created from a template when missing.
    pub config_path: Option<PathBuf>,
    pub queue_path: Option<PathBuf>,
    /// Replaces `general.music_dirs` when set.
    pub music_dir: Option<PathBuf>,
    /// Start with an empty queue and leave the saved one untouched.
    pub empty: bool,
}

/// Build the runtime: scripts, settings, library, queue and player.
///
/// Only a broken default configuration is fatal. Problems with the user
/// script, the environment overrides or the saved queue are logged and
/// shown as a notification once the UI is up.
pub fn bootstrap(opts: &StartupOptions, engine: Box<dyn AudioEngine>) -> anyhow::Result<Runtime> {
    let env = ScriptEnv::new().context("failed to start the script environment")?;
    env.exec_default(DEFAULT_CONFIG)
        .context("built-in configuration failed")?;

    let mut notices = Vec::new();
    if let Some(path) = &opts.config_path {
        if let Err(e) = run_user_config(&env, path) {
            notices.push(e);
        }
    }
    let settings = load_settings(&env, &mut notices);

    let music_dirs = match &opts.music_dir {
        Some(dir) => vec![dir.clone()],
        None => settings.music_dirs(),
    };
    let scan_options = ScanOptions {
        extensions: settings.extensions(),
        sort_by_mtime: settings.general.sort_by_mtime,
        ..ScanOptions::default()
    };
    let entries = library::scan(&music_dirs, &scan_options);
    tracing::info!(entries = entries.len(), dirs = ?music_dirs, "library scanned");

    let mut queue = PlaybackQueue::new().with_extensions(settings.extensions());
    queue.set_loop_mode(settings.general.queue_loop);
    queue.set_loop_policy(settings.general.loop_policy.into());
    if let Some(path) = opts.queue_path.as_ref().filter(|_| !opts.empty) {
        let load_previous = settings.general.load_prev_queue;
        if let Some(store) = open_queue(path, &mut queue, load_previous, &mut notices) {
            queue.attach_store(store);
        }
    }

    let mut runtime = Runtime::new(env, settings, engine, queue, App::new(entries));
    if let Some(notice) = notices.last() {
        runtime.app.notify_error(notice.clone());
    }

    runtime.fire(HookEvent::Enter);
    if !runtime.queue.is_empty() {
        if let Err(e) = runtime.player.play_queue(&mut runtime.queue) {
            runtime.app.notify_error(e.to_string());
        }
    }
    runtime.settle();
    Ok(runtime)
}

fn run_user_config(env: &ScriptEnv, path: &Path) -> Result<(), String> {
    match config::ensure_user_config(path, USER_TEMPLATE) {
        Ok(true) => tracing::info!(path = %path.display(), "created user configuration"),
        Ok(false) => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not create user configuration"),
    }

    let src = match fs::read_to_string(path) {
        Ok(src) => src,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read user configuration");
            return Err(format!("{}: {e}", path.display()));
        }
    };
    env.exec_user(&src, &path.display().to_string())
        .map_err(|e| e.to_string())
}

/// Typed settings from the script globals, with environment overrides.
/// Every failure falls back to the previous layer.
fn load_settings(env: &ScriptEnv, notices: &mut Vec<String>) -> Settings {
    let settings = env.settings().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "invalid settings in user configuration, using defaults");
        notices.push(e.to_string());
        Settings::default()
    });

    let mut settings = match settings.clone().with_env_overrides() {
        Ok(overridden) => overridden,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring environment overrides");
            notices.push(format!("environment overrides: {e}"));
            settings
        }
    };

    if let Err(e) = settings.validate() {
        tracing::warn!(error = %e, "invalid settings, restoring default extensions");
        notices.push(e);
        settings.general.extensions = GeneralSettings::default().extensions;
    }
    settings
}

/// Start the queue writer for `path`, loading the saved queue first when
/// asked to. An unreadable file leaves the queue empty.
fn open_queue(
    path: &Path,
    queue: &mut PlaybackQueue,
    load_previous: bool,
    notices: &mut Vec<String>,
) -> Option<QueueStore> {
    let store = match QueueStore::spawn(path) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!(error = %e, "queue will not be saved");
            notices.push(e.to_string());
            return None;
        }
    };
    if load_previous && path.exists() {
        match store.load_into(queue) {
            Ok(n) => tracing::info!(tracks = n, "restored previous queue"),
            Err(e) => {
                tracing::warn!(error = %e, "could not restore previous queue");
                queue.clear();
                notices.push(e.to_string());
            }
        }
    }
    Some(store)
}
