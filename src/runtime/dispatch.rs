use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Panel, Popup, PopupOutcome, SearchTarget};
use crate::audio::{AudioEngine, FinishedTrack};
use crate::commands::{Command, CommandRegistry};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::hooks::HookEvent;
use crate::keybinds::KeyDescriptor;
use crate::library::Track;
use crate::player::{Advance, Player, PlayerStatus};
use crate::queue::PlaybackQueue;
use crate::script::{HostRequest, HostView, ScriptEnv, TrackInfo};
use crate::ui::View;

use super::worker::{self, LoopEvent};

/// Upper bound on script requests handled per loop turn. Hooks that keep
/// issuing commands which fire the same hooks would otherwise never yield.
pub const MAX_REQUESTS_PER_TURN: usize = 64;

/// Everything the event loop owns.
pub struct Runtime {
    pub env: ScriptEnv,
    pub settings: Settings,
    pub commands: CommandRegistry,
    pub player: Player,
    pub queue: PlaybackQueue,
    pub app: App,
    events_tx: Sender<LoopEvent>,
    events_rx: Receiver<LoopEvent>,
}

impl Runtime {
    pub fn new(
        env: ScriptEnv,
        settings: Settings,
        engine: Box<dyn AudioEngine>,
        queue: PlaybackQueue,
        app: App,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let mut player = Player::new(engine, settings.general.volume);

        let finished_tx = events_tx.clone();
        player.on_finish(Box::new(move |finished: FinishedTrack| {
            let _ = finished_tx.send(LoopEvent::TrackFinished(finished));
        }));

        Self {
            env,
            settings,
            commands: CommandRegistry::with_defaults(),
            player,
            queue,
            app,
            events_tx,
            events_rx,
        }
    }

    pub fn events_sender(&self) -> Sender<LoopEvent> {
        self.events_tx.clone()
    }

    pub fn view(&self) -> View<'_> {
        View {
            app: &self.app,
            queue: &self.queue,
            player: &self.player,
            settings: &self.settings,
            commands: &self.commands,
        }
    }

    /// Snapshot of what the accessor modules may read.
    fn host_view(&self) -> HostView {
        let playlist_focused = self
            .app
            .selected_entry()
            .filter(|e| e.track.is_audio_file())
            .map(|e| TrackInfo::from_track(&e.track));
        HostView {
            playlist_focused,
            queue_focused: self.queue.get(self.app.queue_selected).map(TrackInfo::from_track),
            now_playing: self.player.now_playing().map(TrackInfo::from_track),
        }
    }

    fn sync_view(&self) {
        self.env.set_view(self.host_view());
    }

    /// Run the hooks for `event`, surfacing failures in the status bar.
    pub fn fire(&mut self, event: HookEvent) {
        self.sync_view();
        let report = self.env.fire(event);
        if let Some(first) = report.failures.first() {
            self.app.notify_error(format!("{event} hook failed: {first}"));
        }
    }

    fn flush_player_events(&mut self) {
        for event in self.player.take_events() {
            self.fire(event);
        }
    }

    /// Drain messages from the audio thread and shell workers.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                LoopEvent::TrackFinished(finished) => {
                    let result = self.player.on_track_finished(&mut self.queue, &finished);
                    self.report_advance(result);
                }
                LoopEvent::ShellDone {
                    callback,
                    output,
                    ok,
                } => {
                    if !ok {
                        tracing::warn!(output = %output.trim_end(), "shell command failed");
                    }
                    if let Some(id) = callback {
                        self.sync_view();
                        let result = self.env.run_callback(id, (output, ok));
                        self.report(result);
                    }
                }
            }
            self.settle();
        }
    }

    /// Route a key press: popup first, then script keybinds, then the
    /// built-in command table.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.app.should_quit = true;
            return;
        }

        if let Some(outcome) = self.app.handle_popup_key(&key) {
            self.handle_popup_outcome(outcome);
            self.settle();
            return;
        }

        let Some(descriptor) = KeyDescriptor::from_event(&key) else {
            return;
        };
        let context = self.app.context();

        if self.env.has_binding(context, &descriptor) {
            self.sync_view();
            match self.env.dispatch_key(context, &descriptor) {
                // Rebound away by an earlier callback this turn.
                Err(e) if e.is_binding_miss() => {}
                Err(e) => self.app.notify_error(e.to_string()),
                Ok(()) => {}
            }
        } else if let Some(cmd) = self.commands.lookup(context, &descriptor) {
            let result = self.execute(cmd);
            self.report(result);
        }
        self.settle();
    }

    /// Handle what scripts and the player queued, up to the per-turn bound.
    pub fn settle(&mut self) {
        let mut handled = 0;
        loop {
            self.flush_player_events();
            let Some(request) = self.env.next_request() else {
                break;
            };
            if handled == MAX_REQUESTS_PER_TURN {
                let dropped = self.env.discard_requests() + 1;
                tracing::warn!(dropped, "too many script requests in one turn");
                self.app
                    .notify_error(format!("dropped {dropped} script requests (hook loop?)"));
                break;
            }
            handled += 1;
            self.handle_request(request);
        }
    }

    fn handle_request(&mut self, request: HostRequest) {
        match request {
            HostRequest::Info { title, text } => self.app.push_popup(Popup::message(title, text)),
            HostRequest::Debug { text } => {
                tracing::debug!(%text, "debug popup");
                self.app.push_popup(Popup::message("Debug", text));
            }
            HostRequest::Timed { title, text } => {
                let timeout = Duration::from_secs(self.settings.general.popup_timeout);
                self.app.push_popup(Popup::Message {
                    title,
                    text,
                    expires: Some(Instant::now() + timeout),
                });
            }
            HostRequest::Input { prompt, callback } => self.app.push_popup(Popup::Input {
                prompt,
                buffer: String::new(),
                callback,
            }),
            HostRequest::Search {
                title,
                items,
                callback,
            } => self.app.push_popup(Popup::search(
                title,
                items,
                SearchTarget::Script(callback),
            )),
            HostRequest::Shell { command, callback } => {
                if let Err(e) = worker::spawn_shell(command, callback, self.events_sender()) {
                    tracing::warn!(error = %e, "could not start shell worker");
                    if let Some(id) = callback {
                        self.env.drop_callback(id);
                    }
                    self.app.notify_error(format!("shell: {e}"));
                }
            }
            HostRequest::FocusPath(path) => {
                if !self.app.focus_path(&path) {
                    self.app
                        .notify_error(format!("{} is not in the playlist", path.display()));
                }
            }
            HostRequest::Command(cmd) => {
                let result = self.execute(cmd);
                self.report(result);
            }
        }
    }

    fn handle_popup_outcome(&mut self, outcome: PopupOutcome) {
        match outcome {
            PopupOutcome::Pending => {}
            PopupOutcome::Dismissed(popup) => match popup {
                Popup::Input { callback, .. }
                | Popup::Search {
                    target: SearchTarget::Script(callback),
                    ..
                } => self.env.drop_callback(callback),
                _ => {}
            },
            PopupOutcome::Submitted(popup, value) => match popup {
                Popup::Input { callback, .. }
                | Popup::Search {
                    target: SearchTarget::Script(callback),
                    ..
                } => {
                    self.sync_view();
                    let result = self.env.run_callback(callback, value);
                    self.report(result);
                }
                Popup::Search {
                    target: SearchTarget::Commands,
                    ..
                } => match value.parse::<Command>() {
                    Ok(cmd) => {
                        let result = self.execute(cmd);
                        self.report(result);
                    }
                    Err(e) => self.app.notify_error(e.to_string()),
                },
                Popup::Search {
                    target: SearchTarget::ConfirmQuit,
                    ..
                } => {
                    if value == "yes" {
                        self.app.should_quit = true;
                    }
                }
                Popup::Message { .. } => {}
            },
        }
    }

    /// Run one built-in command against the player, queue and UI state.
    pub fn execute(&mut self, cmd: Command) -> Result<()> {
        tracing::debug!(command = %cmd, "execute");
        match cmd {
            Command::Quit => {
                if self.settings.general.confirm_on_exit {
                    let items = vec!["no".to_string(), "yes".to_string()];
                    self.app
                        .push_popup(Popup::search("Quit?", items, SearchTarget::ConfirmQuit));
                } else {
                    self.app.should_quit = true;
                }
            }
            Command::TogglePause => match self.player.status() {
                PlayerStatus::Idle | PlayerStatus::Stopped => {
                    self.player.play_queue(&mut self.queue)?;
                }
                _ => {
                    self.player.toggle_pause();
                }
            },
            Command::Skip => {
                let result = self.player.skip(&mut self.queue);
                self.report_advance(result);
            }
            Command::Forward
            | Command::ForwardFast
            | Command::Rewind
            | Command::RewindFast => {
                let delta = cmd.seek_delta().unwrap_or_default();
                self.player.seek(delta)?;
            }
            Command::VolumeUp => {
                let v = self.player.volume_up();
                self.app.notify(format!("Volume {v}%"));
            }
            Command::VolumeDown => {
                let v = self.player.volume_down();
                self.app.notify(format!("Volume {v}%"));
            }
            Command::ToggleLoop => {
                let on = self.queue.toggle_loop();
                self.app.notify(if on { "Loop on" } else { "Loop off" });
            }
            Command::ShuffleQueue => {
                self.queue.shuffle();
                self.app.notify("Queue shuffled");
            }
            Command::ClearQueue => {
                self.queue.clear();
                self.app.clamp_queue_selection(0);
            }
            Command::ToggleHelp => self.app.show_help = !self.app.show_help,
            Command::CommandSearch => {
                let items = Command::all().map(|c| c.name().to_string()).collect();
                self.app
                    .push_popup(Popup::search("Commands", items, SearchTarget::Commands));
            }
            Command::PlaySelected => match self.app.focus {
                Panel::Queue => {
                    self.player.play_at(&mut self.queue, self.app.queue_selected)?;
                }
                Panel::Playlist => self.enqueue_selected(true)?,
            },
            Command::EnqueueSelected => self.enqueue_selected(false)?,
            Command::DeleteItem => {
                if self.app.focus == Panel::Queue {
                    let removed = self.queue.remove(self.app.queue_selected)?;
                    self.app.clamp_queue_selection(self.queue.len());
                    self.app.notify(format!("Removed {}", removed.name()));
                }
            }
            Command::MoveUp => self.app.select_prev(self.queue.len()),
            Command::MoveDown => self.app.select_next(self.queue.len()),
            Command::ReorderUp | Command::ReorderDown => {
                if self.app.focus == Panel::Queue {
                    let from = self.app.queue_selected;
                    let to = if cmd == Command::ReorderUp {
                        from.checked_sub(1)
                    } else {
                        Some(from + 1).filter(|&i| i < self.queue.len())
                    };
                    if let Some(to) = to {
                        self.queue.reorder(from, to)?;
                        self.app.queue_selected = to;
                    }
                }
            }
            Command::FocusNextPanel => self.app.focus_next(),
        }
        Ok(())
    }

    /// Add the highlighted playlist entry to the queue. A directory adds
    /// every track below it. Starts playback when the player is idle.
    fn enqueue_selected(&mut self, play_now: bool) -> Result<()> {
        let tracks = self.selected_tracks();
        let Some(first) = tracks.first() else {
            return match self.app.selected_entry() {
                Some(entry) => Err(Error::InvalidTrack(entry.track.path().to_path_buf())),
                None => Ok(()),
            };
        };
        let first_name = first.name().to_string();

        let mut first_index = None;
        for track in &tracks {
            let index = self.queue.enqueue(track.clone())?;
            first_index.get_or_insert(index);
        }
        match tracks.len() {
            1 => self.app.notify(format!("Queued {first_name}")),
            n => self.app.notify(format!("Queued {n} tracks")),
        }

        let idle = matches!(
            self.player.status(),
            PlayerStatus::Idle | PlayerStatus::Stopped
        );
        match first_index {
            Some(index) if play_now => self.player.play_at(&mut self.queue, index)?,
            _ if idle => self.player.play_queue(&mut self.queue)?,
            _ => {}
        }
        Ok(())
    }

    fn selected_tracks(&self) -> Vec<Track> {
        let i = self.app.playlist_selected;
        let Some(entry) = self.app.entries.get(i) else {
            return Vec::new();
        };
        if entry.track.is_audio_file() {
            return vec![entry.track.clone()];
        }
        self.app.entries[i + 1..]
            .iter()
            .take_while(|e| e.depth > entry.depth)
            .filter(|e| e.track.is_audio_file())
            .map(|e| e.track.clone())
            .collect()
    }

    fn report_advance(&mut self, result: Result<Advance>) {
        match result {
            Ok(Advance::Idle) => self.app.notify("Queue finished"),
            Ok(_) => {}
            Err(e) => self.app.notify_error(e.to_string()),
        }
    }

    fn report(&mut self, result: Result<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "command failed");
            self.app.notify_error(e.to_string());
        }
    }

    /// Fire `exit`, stop playback and wait for the queue file.
    pub fn shutdown(&mut self) {
        self.fire(HookEvent::Exit);
        let dropped = self.env.discard_requests();
        if dropped > 0 {
            tracing::debug!(dropped, "ignoring requests issued while exiting");
        }
        self.player.stop();
        if let Some(store) = self.queue.store() {
            store.flush();
        }
        tracing::info!("bye");
    }
}
