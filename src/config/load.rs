use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::{env, path};

use ::config::{Config, ConfigError, Environment, File, FileFormat};

use super::schema::Settings;

const APP_DIR: &str = "lyre";

impl Settings {
    /// Layer `LYRE__SECTION__KEY` environment variables over `self`.
    ///
    /// `self` is round-tripped through TOML so the `config` crate can merge
    /// it with the environment source.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let base = toml::to_string(&self).map_err(|e| ConfigError::Message(e.to_string()))?;

        Config::builder()
            .add_source(File::from_str(&base, FileFormat::Toml))
            .add_source(
                Environment::with_prefix("LYRE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.general.extensions.is_empty() {
            return Err("general.extensions must name at least one extension".to_string());
        }
        Ok(())
    }

    pub fn music_dirs(&self) -> Vec<PathBuf> {
        self.general.music_dirs.iter().map(|d| expand_home(d)).collect()
    }

    /// Lowercased, dot-less extensions.
    pub fn extensions(&self) -> Vec<String> {
        self.general
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect()
    }
}

/// Resolve the user config path: `--config`, then `LYRE_CONFIG_PATH`, then
/// XDG defaults.
pub fn resolve_config_path(cli: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = cli {
        return Some(p.to_path_buf());
    }
    if let Some(p) = env::var_os("LYRE_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// `$XDG_CONFIG_HOME/lyre/config.lua` or `~/.config/lyre/config.lua` when
/// `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", &[".config"]).map(|d| d.join(APP_DIR).join("config.lua"))
}

/// `$XDG_DATA_HOME/lyre` or `~/.local/share/lyre`. Holds the queue file
/// and the log.
pub fn data_dir() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"]).map(|d| d.join(APP_DIR))
}

pub fn queue_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join("queue.cache"))
}

fn xdg_dir(var: &str, home_fallback: &[&str]) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg));
    }
    env::var_os("HOME").map(|home| {
        home_fallback
            .iter()
            .fold(PathBuf::from(home), |acc, part| acc.join(part))
    })
}

/// Expand a leading `~` or `$HOME`.
pub fn expand_home(raw: &str) -> PathBuf {
    let rest = raw
        .strip_prefix('~')
        .or_else(|| raw.strip_prefix("$HOME"));
    match (rest, env::var_os("HOME")) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with(path::MAIN_SEPARATOR) => {
            PathBuf::from(home).join(rest.trim_start_matches(path::MAIN_SEPARATOR))
        }
        _ => PathBuf::from(raw),
    }
}

/// Write `template` to `path` unless something already exists there.
/// Returns whether the file was created.
pub fn ensure_user_config(path: &Path, template: &str) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, template)?;
    Ok(true)
}
