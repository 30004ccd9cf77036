use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::MediaDriver;
use crate::config;
use crate::player::{Advance, Coordinator, ListItem, PlayerError, PresentationSink};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: advances the coordinator, draws and handles
/// input. Returns `Ok(())` when shutdown is requested.
pub fn run<D: MediaDriver>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    player: &mut Coordinator<D, App>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        player.tick(Instant::now());

        let volume = player.volume();
        terminal.draw(|f| ui::draw(f, player.sink(), volume, &settings.ui, &settings.controls))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, player, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Surface a rejected operation the way media errors are surfaced.
fn report<D: MediaDriver>(player: &mut Coordinator<D, App>, result: Result<(), PlayerError>) {
    if let Err(e) = result {
        player.sink_mut().show_message(&e.to_string());
    }
}

fn play_item<D: MediaDriver>(player: &mut Coordinator<D, App>, item: ListItem) {
    let result = match item {
        ListItem::Catalog { index, .. } => player.play_track(index),
        ListItem::Preview(track) => player.play_foreign_preview(track),
    };
    report(player, result);
}

fn handle_search_key<D: MediaDriver>(key: KeyEvent, player: &mut Coordinator<D, App>) {
    match key.code {
        KeyCode::Esc => {
            player.sink_mut().clear_search();
            player.search("");
        }
        KeyCode::Backspace => player.sink_mut().pop_search_char(),
        KeyCode::Char('j') | KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            player.sink_mut().next();
        }
        KeyCode::Char('k') | KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            player.sink_mut().prev();
        }
        KeyCode::Char(c) => {
            if !c.is_control() {
                player.sink_mut().push_search_char(c);
            }
        }
        KeyCode::Enter => {
            player.sink_mut().exit_search_mode();
            let query = player.sink().search_query.clone();
            player.search(&query);
        }
        _ => {}
    }
}

/// Returns `true` when the user asked to quit.
fn handle_key_event<D: MediaDriver>(
    key: KeyEvent,
    settings: &config::Settings,
    player: &mut Coordinator<D, App>,
    state: &mut EventLoopState,
) -> bool {
    if player.sink().search_mode {
        state.pending_gg = false;
        handle_search_key(key, player);
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    let scrub = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;
    let volume_step = settings.controls.volume_step;

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => player.sink_mut().enter_search_mode(),
        KeyCode::Tab => player.sink_mut().cycle_page(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                player.sink_mut().top();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => player.sink_mut().bottom(),
        KeyCode::Char('j') | KeyCode::Down => player.sink_mut().next(),
        KeyCode::Char('k') | KeyCode::Up => player.sink_mut().prev(),
        KeyCode::Enter => {
            if let Some(item) = player.sink().selected_item().cloned() {
                play_item(player, item);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => player.toggle_play_pause(),
        KeyCode::Char('l') => player.play_next(Advance::Manual),
        KeyCode::Char('h') => player.play_previous(),
        KeyCode::Char('L') => player.seek_by(scrub),
        KeyCode::Char('H') => player.seek_by(-scrub),
        KeyCode::Char('a') => {
            if let Some(entry) = player.sink().selected_item().map(ListItem::to_queue_entry) {
                let result = player.add_to_queue(entry).map(|_| ());
                report(player, result);
            }
        }
        KeyCode::Char('f') => {
            let target = player.sink().selected_item().and_then(ListItem::catalog_index);
            if target.is_some() {
                let result = player.toggle_favorite(target).map(|_| ());
                report(player, result);
            }
        }
        KeyCode::Char('F') => {
            let result = player.toggle_favorite(None).map(|_| ());
            report(player, result);
        }
        KeyCode::Char('c') => {
            if let Some(genre) = player.sink().selected_item().map(|i| i.genre().to_string()) {
                player.filter_genre(&genre);
            }
        }
        KeyCode::Char('Q') => player.toggle_queue_view(),
        KeyCode::Char('s') => player.toggle_shuffle(),
        KeyCode::Char('r') => player.toggle_repeat(),
        KeyCode::Char('+') | KeyCode::Char('=') => player.adjust_volume(volume_step),
        KeyCode::Char('-') => player.adjust_volume(-volume_step),
        KeyCode::Char('K') => player.sink_mut().toggle_metadata_window(),
        _ => {}
    }

    false
}
