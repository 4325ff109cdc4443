use std::path::PathBuf;

use super::*;
use crate::commands::Command;
use crate::config::LoopPolicySetting;

fn env() -> ScriptEnv {
    let env = ScriptEnv::new().unwrap();
    env.exec_default(DEFAULT_CONFIG).unwrap();
    env
}

fn drain(env: &ScriptEnv) -> Vec<HostRequest> {
    std::iter::from_fn(|| env.next_request()).collect()
}

fn key(s: &str) -> KeyDescriptor {
    s.parse().unwrap()
}

#[test]
fn out_of_range_volume_is_clamped_without_losing_other_settings() {
    let env = env();
    env.exec_user("general.volume = 150\ngeneral.popup_timeout = 9", "config.lua").unwrap();
    let s = env.settings().unwrap();
    assert_eq!(s.general.volume, 100);
    assert_eq!(s.general.popup_timeout, 9);

    env.exec_user("general.volume = -5", "config.lua").unwrap();
    assert_eq!(env.settings().unwrap().general.volume, 0);
    env.exec_user("general.volume = 300", "config.lua").unwrap();
    assert_eq!(env.settings().unwrap().general.volume, 100);
}

#[test]
fn user_volume_overrides_default() {
    let env = env();
    assert_eq!(env.settings().unwrap().general.volume, 80);

    env.exec_user("general.volume = 50", "config.lua").unwrap();
    assert_eq!(env.settings().unwrap().general.volume, 50);
}

#[test]
fn default_config_matches_struct_defaults() {
    assert_eq!(env().settings().unwrap(), Settings::default());
}

#[test]
fn unknown_keys_and_functions_are_inert() {
    let env = env();
    env.exec_user(
        r#"
        general.invidious_instance = "https://example.org"
        general.helper = function() end
        extra = { anything = 1 }
        general.loop_policy = "replay-in-place"
        "#,
        "config.lua",
    )
    .unwrap();
    let s = env.settings().unwrap();
    assert_eq!(s.general.loop_policy, LoopPolicySetting::ReplayInPlace);
}

#[test]
fn broken_default_config_is_a_script_error() {
    let env = ScriptEnv::new().unwrap();
    let err = env.exec_default("general = {").unwrap_err();
    assert!(matches!(err, Error::ScriptExecution(_)));
}

#[test]
fn failed_user_script_keeps_earlier_definitions() {
    let env = env();
    let err = env
        .exec_user("general.volume = 42\nerror('bad config')", "config.lua")
        .unwrap_err();
    assert!(matches!(err, Error::ScriptExecution(msg) if msg.contains("bad config")));
    assert_eq!(env.settings().unwrap().general.volume, 42);
    // Default-defined modules are still usable.
    env.exec_user("assert(List.reduce({1, 2}, function(a, x) return a + x end, 0) == 3)", "t")
        .unwrap();
}

#[test]
fn list_module_collects_filters_and_reduces() {
    let env = env();
    env.exec_user(
        r#"
        local xs = { 1, 2, 3, 4 }
        local doubled = List.collect(xs, function(x) return x * 2 end)
        assert(#doubled == 4 and doubled[4] == 8)
        local even = List.filter(xs, function(x) return x % 2 == 0 end)
        assert(#even == 2 and even[1] == 2)
        assert(List.reduce(xs, function(acc, x) return acc + x end, 10) == 20)
        "#,
        "list",
    )
    .unwrap();
}

#[test]
fn event_module_registers_rust_side_hooks() {
    let env = env();
    env.exec_user(
        r#"
        played = 0
        Event.add_hook("play", function() played = played + 1 end)
        Event.add_hook("play", function() error("hook broke") end)
        Event.add_hook("play", function() played = played + 1 end)
        "#,
        "hooks",
    )
    .unwrap();

    let report = env.fire(HookEvent::Play);
    assert_eq!(report.ran, 3);
    assert_eq!(report.failures.len(), 1);
    env.exec_user("assert(played == 2)", "check").unwrap();

    // Scripts can fire events too, and see the failure count.
    env.exec_user("assert(Event.run_hooks('play') == 1 and played == 4)", "check")
        .unwrap();
    assert_eq!(env.fire(HookEvent::Exit).ran, 0);
}

#[test]
fn keybinds_module_binds_per_context() {
    let env = env();
    env.exec_user(
        r#"
        hit = ""
        Keybinds.def_g("x", function() hit = "global" end)
        Keybinds.def_p("y", function() hit = "playlist" end)
        Keybinds.def_q("Space", function() hit = "queue" end)
        "#,
        "keys",
    )
    .unwrap();

    env.dispatch_key(KeyContext::Queue, &key("x")).unwrap();
    env.exec_user("assert(hit == 'global')", "check").unwrap();
    env.dispatch_key(KeyContext::Queue, &key(" ")).unwrap();
    env.exec_user("assert(hit == 'queue')", "check").unwrap();

    assert!(env.has_binding(KeyContext::Playlist, &key("y")));
    assert!(!env.has_binding(KeyContext::Queue, &key("y")));
    assert!(env.dispatch_key(KeyContext::Queue, &key("y")).unwrap_err().is_binding_miss());

    assert!(env.exec_user("Keybinds.def_g('NotAKey', quit)", "bad").is_err());
}

#[test]
fn command_globals_queue_requests() {
    let env = env();
    env.exec_user("Keybinds.def_g('p', skip)", "keys").unwrap();
    env.dispatch_key(KeyContext::Playlist, &key("p")).unwrap();
    env.exec_user("volume_up(); toggle_pause()", "direct").unwrap();

    assert_eq!(
        drain(&env),
        vec![
            HostRequest::Command(Command::Skip),
            HostRequest::Command(Command::VolumeUp),
            HostRequest::Command(Command::TogglePause),
        ]
    );
    assert_eq!(env.pending_requests(), 0);
}

#[test]
fn popups_and_callbacks_round_trip_through_the_loop() {
    let env = env();
    env.exec_user(
        r#"
        info_popup("just text")
        show_popup("Title", "body")
        input_popup("Name?", function(s) answer = s end)
        search_popup("Pick", { "a", "b" }, function(s) picked = s end)
        shell("echo hi", function(out, ok) shell_out = out; shell_ok = ok end)
        Playlist.focus("/music/a.mp3")
        "#,
        "popups",
    )
    .unwrap();

    let requests = drain(&env);
    assert_eq!(
        requests[0],
        HostRequest::Info {
            title: "Info".into(),
            text: "just text".into()
        }
    );
    assert_eq!(
        requests[1],
        HostRequest::Timed {
            title: "Title".into(),
            text: "body".into()
        }
    );
    let HostRequest::Input { callback: input, .. } = requests[2] else {
        panic!("expected input popup, got {:?}", requests[2]);
    };
    let HostRequest::Search { ref items, callback: search, .. } = requests[3] else {
        panic!("expected search popup, got {:?}", requests[3]);
    };
    assert_eq!(items, &vec!["a".to_string(), "b".to_string()]);
    let HostRequest::Shell { callback: Some(shell), ref command } = requests[4] else {
        panic!("expected shell, got {:?}", requests[4]);
    };
    assert_eq!(command, "echo hi");
    assert_eq!(
        requests[5],
        HostRequest::FocusPath(PathBuf::from("/music/a.mp3"))
    );

    env.run_callback(input, "lyre").unwrap();
    env.run_callback(search, "b").unwrap();
    env.run_callback(shell, ("hi\n", true)).unwrap();
    env.exec_user(
        "assert(answer == 'lyre' and picked == 'b' and shell_out == 'hi\\n' and shell_ok)",
        "check",
    )
    .unwrap();

    // Consumed callbacks are gone.
    env.run_callback(input, "again").unwrap();
    env.exec_user("assert(answer == 'lyre')", "check").unwrap();
}

#[test]
fn accessors_return_snapshots_or_nil() {
    let env = env();
    env.exec_user("assert(Player.current_audio() == nil)", "check").unwrap();

    env.set_view(HostView {
        now_playing: Some(TrackInfo {
            path: "/music/a.mp3".into(),
            name: "a".into(),
            duration: None,
        }),
        queue_focused: Some(TrackInfo {
            path: "/music/b.mp3".into(),
            name: "b".into(),
            duration: Some(61.5),
        }),
        playlist_focused: None,
    });
    env.exec_user(
        r#"
        local now = Player.current_audio()
        assert(now.name == "a" and now.path == "/music/a.mp3" and now.duration == nil)
        now.name = "changed"
        assert(Player.current_audio().name == "a")
        assert(Queue.get_focused().duration == 61.5)
        assert(Playlist.get_focused() == nil)
        "#,
        "check",
    )
    .unwrap();
}

/// A mono 8 kHz 8-bit PCM file holding `secs` seconds of silence.
fn write_wav(path: &std::path::Path, secs: u32) {
    let data_len = 8000 * secs;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // channels
    bytes.extend_from_slice(&8000u32.to_le_bytes()); // sample rate
    bytes.extend_from_slice(&8000u32.to_le_bytes()); // byte rate
    bytes.extend_from_slice(&1u16.to_le_bytes()); // block align
    bytes.extend_from_slice(&8u16.to_le_bytes()); // bits per sample
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(bytes.len() + data_len as usize, 0x80);
    std::fs::write(path, bytes).unwrap();
}

#[test]
fn track_info_reads_the_duration_of_unplayed_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_wav(&path, 2);
    let track = crate::library::Track::from_path_with(&path, &["wav".to_string()]);
    assert_eq!(track.cached_duration(), None);

    let info = TrackInfo::from_track(&track);
    let secs = info.duration.expect("duration from the file header");
    assert!((secs - 2.0).abs() < 0.1, "got {secs}");
    assert!(track.cached_duration().is_some());
}
