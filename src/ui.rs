//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::str::FromStr;
use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, Panel, Popup};
use crate::commands::CommandRegistry;
use crate::config::{ColorSettings, Settings};
use crate::player::{Player, PlayerStatus};
use crate::queue::PlaybackQueue;

/// Everything a frame is drawn from.
pub struct View<'a> {
    pub app: &'a App,
    pub queue: &'a PlaybackQueue,
    pub player: &'a Player,
    pub settings: &'a Settings,
    pub commands: &'a CommandRegistry,
}

struct Theme {
    accent: Color,
    background: Color,
    foreground: Color,
    popup: Color,
    directory: Color,
    playlist_highlight: Color,
    queue_highlight: Color,
    now_playing: Color,
    subtitle: Color,
}

impl Theme {
    fn from_settings(c: &ColorSettings) -> Self {
        Self {
            accent: color(&c.accent),
            background: color(&c.background),
            foreground: color(&c.foreground),
            popup: color(&c.popup),
            directory: color(&c.playlist_directory),
            playlist_highlight: color(&c.playlist_highlight),
            queue_highlight: color(&c.queue_highlight),
            now_playing: color(&c.now_playing),
            subtitle: color(&c.subtitle),
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default()
        }
    }
}

/// Unknown color names fall back to the terminal default.
fn color(name: &str) -> Color {
    match name.trim() {
        "" | "none" => Color::Reset,
        other => Color::from_str(other).unwrap_or(Color::Reset),
    }
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Keep `selected` on screen in a list of `total` rows with `height` rows
/// visible. Returns the visible range and the selection inside it.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected.min(total.saturating_sub(1)));
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, view: &View<'_>) {
    let theme = Theme::from_settings(&view.settings.color);
    frame.render_widget(Block::default().style(theme.base()), frame.area());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.area());
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[0]);

    draw_playlist(frame, view, &theme, panels[0]);
    draw_queue(frame, view, &theme, panels[1]);
    draw_now_playing(frame, view, &theme, rows[1]);
    draw_status_line(frame, view, &theme, rows[2]);

    if view.app.show_help && !view.app.has_popup() {
        draw_help(frame, view, &theme, rows[0]);
    }
    for popup in &view.app.popups {
        draw_popup(frame, popup, &theme, frame.area());
    }
}

fn draw_playlist(frame: &mut Frame, view: &View<'_>, theme: &Theme, area: Rect) {
    let app = view.app;
    let emoji = view.settings.general.use_emoji;
    let (dir_icon, file_icon) = if emoji {
        (
            view.settings.emoji.playlist.as_str(),
            view.settings.emoji.file.as_str(),
        )
    } else {
        ("+", "-")
    };

    let height = area.height.saturating_sub(2) as usize;
    let (start, end, sel) = visible_window(app.entries.len(), height, app.playlist_selected);

    let items: Vec<ListItem> = app.entries[start..end]
        .iter()
        .map(|entry| {
            let indent = "  ".repeat(entry.depth.saturating_sub(1));
            if entry.track.is_audio_file() {
                ListItem::new(format!("{indent}{file_icon} {}", entry.track.name()))
            } else {
                ListItem::new(format!("{indent}{dir_icon} {}", entry.track.name()))
                    .style(Style::default().fg(theme.directory))
            }
        })
        .collect();

    let focused = app.focus == Panel::Playlist;
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border(focused))
                .title(" playlist "),
        )
        .highlight_style(
            Style::default()
                .fg(theme.playlist_highlight)
                .add_modifier(Modifier::REVERSED),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !app.entries.is_empty() {
        state.select(Some(sel));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_queue(frame: &mut Frame, view: &View<'_>, theme: &Theme, area: Rect) {
    let app = view.app;
    let queue = view.queue;
    let settings = view.settings;

    let height = area.height.saturating_sub(2) as usize;
    let (start, end, sel) = visible_window(queue.len(), height, app.queue_selected);

    let items: Vec<ListItem> = queue.items()[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let i = start + offset;
            let dur = track
                .duration()
                .map(format_mmss)
                .unwrap_or_else(|| "--:--".to_string());
            let line = format!("{:>3}. {}  [{}]", i + 1, track.name(), dur);
            if queue.cursor() == Some(i) {
                ListItem::new(line).style(
                    Style::default()
                        .fg(theme.now_playing)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ListItem::new(line)
            }
        })
        .collect();

    let loop_text = match (settings.general.use_emoji, queue.loop_mode()) {
        (true, true) => settings.emoji.r#loop.clone(),
        (true, false) => settings.emoji.noloop.clone(),
        (false, true) => "loop".to_string(),
        (false, false) => "no loop".to_string(),
    };
    let title = format!(" queue ({}) {} ", queue.len(), loop_text);

    let focused = app.focus == Panel::Queue;
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border(focused))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .fg(theme.queue_highlight)
                .add_modifier(Modifier::REVERSED),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !queue.is_empty() {
        state.select(Some(sel));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_now_playing(frame: &mut Frame, view: &View<'_>, theme: &Theme, area: Rect) {
    let player = view.player;

    let state = match player.status() {
        PlayerStatus::Playing => "Playing",
        PlayerStatus::Paused => "Paused",
        PlayerStatus::Stopped => "Stopped",
        PlayerStatus::Idle => "Idle",
    };

    let lines = match player.now_playing() {
        Some(track) => {
            let elapsed = player.position();
            let time = match player.duration() {
                Some(total) => format!("{} / {}", format_mmss(elapsed), format_mmss(total)),
                None => format_mmss(elapsed),
            };
            vec![
                Line::from(Span::styled(
                    track.name().to_string(),
                    Style::default()
                        .fg(theme.now_playing)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("{state} • {time} • vol {}%", player.volume()),
                    Style::default().fg(theme.subtitle),
                )),
            ]
        }
        None => vec![
            Line::from("Nothing playing"),
            Line::from(Span::styled(
                format!("{state} • vol {}%", player.volume()),
                Style::default().fg(theme.subtitle),
            )),
        ],
    };

    let par = Paragraph::new(lines).block(
        Block::bordered()
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            })
            .title(" now playing "),
    );
    frame.render_widget(par, area);
}

fn draw_status_line(frame: &mut Frame, view: &View<'_>, theme: &Theme, area: Rect) {
    let line = match &view.app.notification {
        Some(n) if n.is_error => Line::from(Span::styled(
            n.text.clone(),
            Style::default().fg(Color::Red),
        )),
        Some(n) => Line::from(Span::styled(
            n.text.clone(),
            Style::default().fg(theme.accent),
        )),
        None => Line::from(" [?] help  [:] commands  [tab] switch panel  [q] quit"),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_help(frame: &mut Frame, view: &View<'_>, theme: &Theme, area: Rect) {
    let rows: Vec<Line> = view
        .commands
        .bindings()
        .into_iter()
        .map(|(ctx, key, cmd)| {
            Line::from(vec![
                Span::styled(format!("{:<9}", ctx.as_str()), Style::default().fg(theme.subtitle)),
                Span::styled(format!("{:<8}", key.to_string()), Style::default().fg(theme.accent)),
                Span::raw(cmd.description()),
            ])
        })
        .collect();

    let popup_area = centered_rect_sized(60, rows.len() as u16 + 2, area);
    frame.render_widget(Clear, popup_area);
    let par = Paragraph::new(rows)
        .style(Style::default().bg(theme.popup))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" help (? closes) ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(par, popup_area);
}

fn draw_popup(frame: &mut Frame, popup: &Popup, theme: &Theme, area: Rect) {
    let block = |title: &str| {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .title(format!(" {title} "))
            .style(Style::default().bg(theme.popup))
    };

    match popup {
        Popup::Message { title, text, .. } => {
            let height = text.lines().count() as u16 + 2;
            let popup_area = centered_rect_sized(64, height.max(5), area);
            frame.render_widget(Clear, popup_area);
            let par = Paragraph::new(text.as_str())
                .block(block(title))
                .wrap(Wrap { trim: false });
            frame.render_widget(par, popup_area);
        }
        Popup::Input { prompt, buffer, .. } => {
            let popup_area = centered_rect_sized(50, 5, area);
            frame.render_widget(Clear, popup_area);
            let par = Paragraph::new(format!("{buffer}_")).block(block(prompt));
            frame.render_widget(par, popup_area);
        }
        Popup::Search {
            title,
            items,
            query,
            selected,
            ..
        } => {
            let popup_area = centered_rect_sized(60, 16, area);
            frame.render_widget(Clear, popup_area);
            let outer = block(title);
            let inner = outer.inner(popup_area);
            frame.render_widget(outer, popup_area);

            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(1)])
                .split(inner);
            frame.render_widget(Paragraph::new(format!("> {query}_")), parts[0]);

            let matches = popup.matches();
            let height = parts[1].height as usize;
            let (start, end, sel) = visible_window(matches.len(), height, *selected);
            let rows: Vec<ListItem> = matches[start..end]
                .iter()
                .map(|(i, positions)| ListItem::new(highlight(&items[*i], positions, theme)))
                .collect();

            let list = List::new(rows).highlight_style(
                Style::default().add_modifier(Modifier::REVERSED),
            );
            let mut state = ListState::default();
            if !matches.is_empty() {
                state.select(Some(sel));
            }
            frame.render_stateful_widget(list, parts[1], &mut state);
        }
    }
}

/// Style the fuzzy-matched characters of `text`.
fn highlight<'a>(text: &'a str, positions: &[usize], theme: &Theme) -> Line<'a> {
    let mut spans = Vec::new();
    let mut pos = positions.iter().peekable();
    for (ci, ch) in text.chars().enumerate() {
        if pos.peek() == Some(&&ci) {
            pos.next();
            spans.push(Span::styled(
                ch.to_string(),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(ch.to_string()));
        }
    }
    Line::from(spans)
}
