use serde::{Deserialize, Deserializer, Serialize};

use crate::queue::LoopPolicy;

/// Effective settings, read from the script tables `general`, `emoji` and
/// `color`.
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `LYRE__`, `__` as nested separator)
/// 2) User configuration script
/// 3) Built-in default script
/// 4) Struct defaults (keys the scripts leave out)
///
/// Keys not named here are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub emoji: EmojiSettings,
    pub color: ColorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub confirm_on_exit: bool,
    /// Loop mode the queue starts in.
    pub queue_loop: bool,
    pub loop_policy: LoopPolicySetting,
    /// Restore the queue saved by the previous session.
    pub load_prev_queue: bool,
    /// Seconds a timed popup stays on screen.
    pub popup_timeout: u64,
    /// List newest files first instead of by name.
    pub sort_by_mtime: bool,
    /// Library roots; `~` and `$HOME` are expanded.
    pub music_dirs: Vec<String>,
    pub history_path: String,
    pub use_emoji: bool,
    /// 0..=100; anything outside is clamped on load.
    #[serde(deserialize_with = "clamp_volume")]
    pub volume: u8,
    pub lang_lyrics: Vec<String>,
    pub lyric_source: String,
    pub rename_bytag: bool,
    /// File extensions treated as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            confirm_on_exit: true,
            queue_loop: false,
            loop_policy: LoopPolicySetting::AppendAtTail,
            load_prev_queue: true,
            popup_timeout: 5,
            sort_by_mtime: false,
            music_dirs: vec!["~/Music".to_string()],
            history_path: "~/.local/share/lyre/urls".to_string(),
            use_emoji: true,
            volume: 80,
            lang_lyrics: vec!["en".to_string()],
            lyric_source: "none".to_string(),
            rename_bytag: false,
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
        }
    }
}

fn clamp_volume<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let volume = f64::deserialize(deserializer)?;
    if !(0.0..=100.0).contains(&volume) {
        tracing::warn!(volume, "general.volume out of range, clamping");
    }
    Ok(volume.round().clamp(0.0, 100.0) as u8)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopPolicySetting {
    #[serde(alias = "append_at_tail", alias = "append")]
    AppendAtTail,
    #[serde(alias = "replay_in_place", alias = "replay")]
    ReplayInPlace,
}

impl From<LoopPolicySetting> for LoopPolicy {
    fn from(value: LoopPolicySetting) -> Self {
        match value {
            LoopPolicySetting::AppendAtTail => LoopPolicy::AppendAtTail,
            LoopPolicySetting::ReplayInPlace => LoopPolicy::ReplayInPlace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmojiSettings {
    pub playlist: String,
    pub file: String,
    pub r#loop: String,
    pub noloop: String,
    pub shuffle: String,
}

impl Default for EmojiSettings {
    fn default() -> Self {
        Self {
            playlist: "📁".to_string(),
            file: "🎵".to_string(),
            r#loop: "🔁".to_string(),
            noloop: "➡".to_string(),
            shuffle: "🔀".to_string(),
        }
    }
}

/// Color names as understood by ratatui (`"cyan"`, `"lightgreen"`,
/// `"#ff8800"`, `"reset"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    pub accent: String,
    pub background: String,
    pub foreground: String,
    pub popup: String,
    pub playlist_directory: String,
    pub playlist_highlight: String,
    pub queue_highlight: String,
    pub now_playing: String,
    pub subtitle: String,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            accent: "cyan".to_string(),
            background: "reset".to_string(),
            foreground: "white".to_string(),
            popup: "black".to_string(),
            playlist_directory: "cyan".to_string(),
            playlist_highlight: "cyan".to_string(),
            queue_highlight: "cyan".to_string(),
            now_playing: "green".to_string(),
            subtitle: "yellow".to_string(),
        }
    }
}
