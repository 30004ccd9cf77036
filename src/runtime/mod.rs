use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::RodioDriver;
use crate::config;
use crate::player::{Coordinator, Options};
use crate::storage::JsonStore;

mod event_loop;
mod logging;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = config::Settings::load_or_default();
    logging::init(&settings.logging);

    let dir = env::args().nth(1).map(PathBuf::from);
    let store = settings
        .storage
        .path
        .clone()
        .or_else(config::default_state_path)
        .map(JsonStore::new);
    if let Some(store) = &store {
        log::debug!("library state file: {}", store.path().display());
    }
    let catalog = startup::load_catalog(dir.as_deref(), &settings, store.as_ref());
    log::info!("catalog has {} tracks", catalog.len());

    let driver = RodioDriver::open(Duration::from_millis(settings.search.timeout_ms))?;
    let app = App::new(Duration::from_millis(settings.ui.message_ms));

    let mut coordinator =
        Coordinator::new(driver, app, catalog, Options::from_settings(&settings));
    if let Some(store) = store {
        coordinator = coordinator.with_store(Box::new(store));
    }
    if let Some(provider) = startup::search_provider(&settings.search) {
        coordinator = coordinator.with_search(provider);
    }
    coordinator.init();
    startup::apply_playback_defaults(&mut coordinator, &settings);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(&mut terminal, &settings, &mut coordinator, &mut state);
    coordinator.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("cadenza exiting");
    run_result
}
