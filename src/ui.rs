//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Tabs, Wrap},
};
use std::{
    collections::BTreeMap,
    sync::LazyLock,
    time::{Duration, Instant},
};

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};
use crate::player::{self, Page};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("tab".to_string(), "pages".to_string());
    map.insert("enter".to_string(), "play selected".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next".to_string());
    // H/L is filled dynamically from config.
    map.insert("/".to_string(), "search".to_string());
    map.insert("a".to_string(), "add to queue".to_string());
    map.insert("f".to_string(), "favorite".to_string());
    map.insert("F".to_string(), "favorite playing".to_string());
    map.insert("c".to_string(), "genre".to_string());
    map.insert("Q".to_string(), "queue view".to_string());
    map.insert("s".to_string(), "shuffle".to_string());
    map.insert("r".to_string(), "repeat".to_string());
    map.insert("+/-".to_string(), "volume".to_string());
    map.insert("K".to_string(), "details".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "tab", "gg/G", "/", "a", "f", "F", "c", "Q", "s",
        "r", "+/-", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Parse a `#rrggbb` accent into a terminal colour.
fn accent_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Fraction of the track played, for the progress gauge.
fn progress_ratio(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

fn page_title(page: Page) -> &'static str {
    match page {
        Page::Home => "Home",
        Page::Library => "Library",
        Page::Favorites => "Favorites",
        Page::Search => "Search",
    }
}

fn row_text(item: &player::ListItem) -> String {
    let mut text = format!("{}  [{}]", item.display(), format_mmss(item.duration()));
    if item.is_favorite() {
        text.push_str(" *");
    }
    if item.is_preview() {
        text.push_str(" (preview)");
    }
    text
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

fn left_padded() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    volume: f32,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header with page tabs
    let selected_tab = [Page::Home, Page::Library, Page::Favorites, Page::Search]
        .iter()
        .position(|p| *p == app.page)
        .unwrap_or(0);
    let tabs = Tabs::new(
        [Page::Home, Page::Library, Page::Favorites, Page::Search]
            .iter()
            .map(|p| page_title(*p)),
    )
    .select(selected_tab)
    .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(ui_settings.header_text.as_str())
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(tabs, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    draw_main_list(frame, app, body[0]);
    draw_sidebar(frame, app, body[1]);
    draw_now_playing(frame, app, volume, chunks[2]);

    if app.metadata_window {
        draw_details(frame, app, body[0]);
    }

    let footer_text = controls_text(controls_settings.scrub_seconds);
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_padded()),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}

fn draw_main_list(frame: &mut Frame, app: &App, area: Rect) {
    let items = app.visible_items();
    let title = match app.page {
        Page::Home => " recently played ".to_string(),
        Page::Search if app.search_mode => format!(" search: {}_ ", app.search_query),
        Page::Search => format!(" {} ", app.search_status_text()),
        other => format!(" {} ", page_title(other).to_lowercase()),
    };

    // Center the selected item when possible by creating a visible window.
    // Important: only build ListItems for the visible window (avoid allocating the entire list).
    let total = items.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = app.selected().min(total.saturating_sub(1));
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = sel_pos.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let playing_id = app.now_playing.as_ref();
    let visible_items: Vec<ListItem> = items[start..end]
        .iter()
        .map(|item| {
            let row = ListItem::new(row_text(item));
            if Some(item) == playing_id {
                row.bold()
            } else {
                row
            }
        })
        .collect();

    let list = List::new(visible_items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if total > 0 {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let upcoming: Vec<ListItem> = app
        .sidebar
        .iter()
        .map(|item| ListItem::new(item.display()))
        .collect();
    let title = format!(" {} ", app.sidebar_title.to_lowercase());
    frame.render_widget(
        List::new(upcoming).block(Block::default().borders(Borders::ALL).title(title)),
        halves[0],
    );

    let recent: Vec<ListItem> = app
        .history
        .iter()
        .map(|item| ListItem::new(item.display()))
        .collect();
    frame.render_widget(
        List::new(recent).block(Block::default().borders(Borders::ALL).title(" history ")),
        halves[1],
    );
}

fn draw_now_playing(frame: &mut Frame, app: &App, volume: f32, area: Rect) {
    let icon = if app.playing { "▶" } else { "⏸" };
    let mut spans = vec![Span::raw(format!("{icon} "))];
    match &app.now_playing {
        Some(item) => {
            let mut song = Span::raw(item.display()).bold();
            if let Some(color) = item.accent().and_then(accent_color) {
                song = song.fg(color);
            }
            spans.push(song);
            if app.now_favorite {
                spans.push(Span::raw(" *"));
            }
            if app.now_preview {
                spans.push(Span::raw(" (preview)").italic());
            }
        }
        None => spans.push(Span::raw("Nothing playing")),
    }

    let mut modes: Vec<&str> = Vec::new();
    if app.shuffle {
        modes.push("Shuffle");
    }
    if app.repeat {
        modes.push("Repeat");
    }
    if app.queue_view {
        modes.push("Queue");
    }
    let mut status = format!("Vol {:>3}%", (volume * 100.0).round() as u32);
    if !modes.is_empty() {
        status = format!("{} • {status}", modes.join(" • "));
    }
    if let Some(message) = app.active_message(Instant::now()) {
        status = format!("{message} • {status}");
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .padding(left_padded())
        .title(" now playing ")
        .title_bottom(Line::from(format!(" {status} ")).right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[0]);

    let label = format!("{} / {}", format_mmss(app.elapsed), format_mmss(app.total));
    let gauge = Gauge::default()
        .ratio(progress_ratio(app.elapsed, app.total))
        .label(label)
        .use_unicode(true);
    frame.render_widget(gauge, rows[1]);
}

fn draw_details(frame: &mut Frame, app: &App, area: Rect) {
    // Keep the popup inside the list area so it doesn't cover header/footer.
    let popup_area = centered_rect_sized(72, 9, area);
    frame.render_widget(Clear, popup_area);

    let meta = match app.selected_item() {
        Some(item) => format!(
            "Title: {}\nArtist: {}\nGenre: {}\nDuration: {}\nSource: {}",
            item.title(),
            item.artist(),
            item.genre(),
            format_mmss(item.duration()),
            if item.is_preview() { "preview" } else { "library" },
        ),
        None => "No track selected".to_string(),
    };
    let meta_paragraph = Paragraph::new(meta)
        .block(
            Block::default()
                .padding(left_padded())
                .borders(Borders::ALL)
                .title(" details (K closes) "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(meta_paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_mmss(Duration::from_secs(0)), "00:00");
        assert_eq!(format_mmss(Duration::from_secs(191)), "03:11");
    }

    #[test]
    fn parses_hex_accents() {
        assert_eq!(accent_color("#d63031"), Some(Color::Rgb(0xd6, 0x30, 0x31)));
        assert_eq!(accent_color("d63031"), None);
        assert_eq!(accent_color("#fff"), None);
        assert_eq!(accent_color("#zzzzzz"), None);
    }

    #[test]
    fn progress_is_bounded() {
        let min = Duration::from_secs(60);
        assert_eq!(progress_ratio(Duration::from_secs(30), Duration::ZERO), 0.0);
        assert_eq!(progress_ratio(Duration::from_secs(30), min), 0.5);
        assert_eq!(progress_ratio(Duration::from_secs(90), min), 1.0);
    }

    #[test]
    fn controls_text_includes_scrub_step() {
        let text = controls_text(7);
        assert!(text.contains("[H/L] scrub -/+7s"));
        assert!(text.contains("[Q] queue view"));
        assert!(text.ends_with("[q] quit"));
    }
}
