/// Script-level helpers loaded before any configuration.
pub const PRELUDE: &str = r#"
List = {}

function List.collect(l, f)
  local result = {}
  for _, x in ipairs(l) do
    result[#result + 1] = f(x)
  end
  return result
end

function List.filter(l, f)
  local result = {}
  for _, x in ipairs(l) do
    if f(x) then
      result[#result + 1] = x
    end
  end
  return result
end

function List.reduce(l, f, acc)
  for _, x in ipairs(l) do
    acc = f(acc, x)
  end
  return acc
end
"#;

/// Built-in configuration. Runs before the user's file, in the same scope.
pub const DEFAULT_CONFIG: &str = r#"
general = {
  confirm_on_exit = true,
  queue_loop = false,
  -- "append-at-tail" or "replay-in-place"
  loop_policy = "append-at-tail",
  load_prev_queue = true,
  popup_timeout = 5,
  sort_by_mtime = false,
  music_dirs = { "~/Music" },
  history_path = "~/.local/share/lyre/urls",
  use_emoji = true,
  volume = 80,
  lang_lyrics = { "en" },
  lyric_source = "none",
  rename_bytag = false,
  extensions = { "mp3", "flac", "wav", "ogg" },
}

emoji = {
  playlist = "📁",
  file = "🎵",
  loop = "🔁",
  noloop = "➡",
  shuffle = "🔀",
}

color = {
  accent = "cyan",
  background = "reset",
  foreground = "white",
  popup = "black",
  playlist_directory = "cyan",
  playlist_highlight = "cyan",
  queue_highlight = "cyan",
  now_playing = "green",
  subtitle = "yellow",
}
"#;

/// Written to the user config path when no file exists yet.
pub const USER_TEMPLATE: &str = r#"-- lyre user configuration.
-- Runs after the built-in defaults; assignments here override them.

-- general.volume = 80
-- general.queue_loop = false
-- general.music_dirs = { "~/Music" }

-- Keybinds.def_g("x", function() info_popup("hello", "from config.lua") end)
-- Keybinds.def_q("p", skip)

-- Event.add_hook("new_song", function()
--   local song = Player.current_audio()
--   if song then show_popup("Now playing", song.name) end
-- end)
"#;
