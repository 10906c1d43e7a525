use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::{error::Error, io, time::Duration};
use tracing::{info, warn};

mod actions;
mod app;
mod config;
mod input;
mod logging;
mod models;
mod runtime;
mod storage;
mod ui;

use app::App;
use config::Config;
use storage::TaskStore;

fn main() -> Result<(), Box<dyn Error>> {
    let (config, config_problems) = Config::load();
    let paths = config.data.paths();
    let _log_guard = logging::init(&config.logging, &paths.log_dir);
    for problem in &config_problems {
        warn!(error = %problem, "config problem");
    }
    info!(store_dir = %paths.store_dir.display(), "starting froghop");

    let store = TaskStore::open(&paths.store_dir);
    if let Ok(store) = &store {
        info!(path = %store.path().display(), "task store ready");
    }
    let mut app = App::new(config, store, config::host_prefers_dark());

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err);
    }

    info!("exiting");
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        runtime::tick(app);

        terminal.draw(|f| ui::ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            let event = event::read()?;
            input::handle_event(app, event);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
