use super::*;

#[test]
fn every_command_name_parses_back() {
    for cmd in Command::all() {
        assert_eq!(cmd.name().parse::<Command>().unwrap(), cmd);
    }
    assert!("repl".parse::<Command>().is_err());
}

#[test]
fn names_are_unique() {
    let mut names: Vec<_> = Command::all().map(Command::name).collect();
    let total = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), total);
}

#[test]
fn default_global_keys_match_the_classic_layout() {
    let reg = CommandRegistry::with_defaults();
    let global = |c| reg.lookup(KeyContext::Global, &KeyDescriptor::char(c));
    assert_eq!(global('q'), Some(Command::Quit));
    assert_eq!(global(' '), Some(Command::TogglePause));
    assert_eq!(global('='), Some(Command::VolumeUp));
    assert_eq!(global('_'), Some(Command::VolumeDown));
    assert_eq!(global('n'), Some(Command::Skip));
    assert_eq!(global('B'), Some(Command::RewindFast));
    assert_eq!(global('x'), None);
}

#[test]
fn context_tables_fall_back_to_global() {
    let reg = CommandRegistry::with_defaults();
    let d = KeyDescriptor::char('d');
    assert_eq!(reg.lookup(KeyContext::Queue, &d), Some(Command::DeleteItem));
    assert_eq!(reg.lookup(KeyContext::Playlist, &d), None);
    assert_eq!(
        reg.lookup(KeyContext::Playlist, &KeyDescriptor::char('q')),
        Some(Command::Quit)
    );
    assert_eq!(
        reg.lookup(KeyContext::Queue, &Key::Enter.into()),
        Some(Command::PlaySelected)
    );
}

#[test]
fn seek_commands_carry_their_step() {
    assert_eq!(Command::Forward.seek_delta(), Some(10));
    assert_eq!(Command::RewindFast.seek_delta(), Some(-60));
    assert_eq!(Command::Skip.seek_delta(), None);
}
