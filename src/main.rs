// src/main.rs

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event as TermEvent, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use liveknoxss_rs::adapters::browser::{SharedTabs, TerminalUi};
use liveknoxss_rs::adapters::cookies::CookieJar;
use liveknoxss_rs::adapters::http::ReqwestClient;
use liveknoxss_rs::adapters::storage::{JsonFileStorage, WatchedStorage};
use liveknoxss_rs::config::{Settings, client_version};
use liveknoxss_rs::core::domain::LabelCount;
use liveknoxss_rs::core::engine::{Collaborators, Engine, Event};
use liveknoxss_rs::core::models::Command;
use liveknoxss_rs::logging::initialize_logging;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

mod app;
mod ui;

use app::App;

/// Ticks between two reads of the log file.
const LOG_REFRESH_TICKS: u32 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    initialize_logging()?;
    let settings = Settings::load_default()?;

    // --- Wiring ---
    let tabs = SharedTabs::default();
    let toolbar = TerminalUi::default();
    let (storage, mut snapshots) = WatchedStorage::new(JsonFileStorage::new(settings.storage.state_file()));
    let collaborators = Collaborators {
        tabs: Arc::new(tabs.clone()),
        storage: Arc::new(storage),
        cookies: Arc::new(CookieJar::new(settings.storage.cookie_jar())),
        http: Arc::new(ReqwestClient::new(settings.service.timeout())?),
        notifier: Arc::new(toolbar.clone()),
        renderer: Arc::new(toolbar.clone()),
    };
    let engine = Engine::start(collaborators, Arc::new(LabelCount), settings.service.clone(), &client_version()).await?;
    let (tx, rx) = mpsc::channel(64);
    let engine_task = tokio::spawn(engine.run(rx));

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut app = App::new(tabs, toolbar, &settings.ui);
    let mut tick = 0u32;
    let result = async {
        while !app.should_quit {
            if snapshots.has_changed().unwrap_or(false) {
                app.snapshot = snapshots.borrow_and_update().clone();
            }
            if tick % LOG_REFRESH_TICKS == 0 {
                app.refresh_logs();
            }
            tick = tick.wrapping_add(1);

            terminal.draw(|frame| ui::render(&mut app, frame))?;

            if event::poll(Duration::from_millis(100))? {
                if let Some(event) = handle_events(&mut app)? {
                    tx.send(event).await?;
                }
            }
        }
        Ok::<(), color_eyre::eyre::Report>(())
    }
    .await;

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;

    let _ = tx.send(Event::Shutdown).await;
    engine_task.await??;
    info!("Bye.");
    result
}

/// Reads one terminal event and turns it into an engine event, if any.
fn handle_events(app: &mut App) -> Result<Option<Event>> {
    let TermEvent::Key(key) = event::read()? else {
        return Ok(None);
    };
    if key.kind != KeyEventKind::Press {
        return Ok(None);
    }

    if app.show_disclaimer {
        match key.code {
            KeyCode::Enter => app.show_disclaimer = false,
            KeyCode::Char('q') => app.quit(),
            _ => {}
        }
        return Ok(None);
    }

    if app.is_editing() {
        return Ok(handle_editing_input(app, key.code));
    }
    Ok(handle_normal_input(app, key.code))
}

fn handle_editing_input(app: &mut App, key_code: KeyCode) -> Option<Event> {
    match key_code {
        KeyCode::Enter => app.submit_url().map(Event::NavigationComplete),
        KeyCode::Esc => {
            app.cancel_editing();
            None
        }
        KeyCode::Backspace => {
            app.input.pop();
            None
        }
        KeyCode::Char(c) => {
            app.input.push(c);
            None
        }
        _ => None,
    }
}

fn handle_normal_input(app: &mut App, key_code: KeyCode) -> Option<Event> {
    match key_code {
        KeyCode::Char('q') => {
            app.quit();
            None
        }
        KeyCode::Char('e') => {
            app.start_editing(false);
            None
        }
        KeyCode::Char('n') => {
            app.start_editing(true);
            None
        }
        KeyCode::Tab => app.tabs.cycle().map(|tab| Event::TabActivated(tab.id)),
        KeyCode::Char('r') => app.tabs.active().map(Event::NavigationComplete),
        KeyCode::Char('t') => Some(Event::Command(Command::Toggle)),
        KeyCode::Char('s') => {
            let current = app.popup_state().map(|(_, state)| state.handle_subdomains).unwrap_or(false);
            Some(Event::Command(Command::SetHandleSubdomains(!current)))
        }
        KeyCode::Char('c') => Some(Event::Command(Command::ClearState)),
        KeyCode::Char('l') => {
            app.show_logs = !app.show_logs;
            app.refresh_logs();
            None
        }
        KeyCode::Up => {
            app.scroll_up();
            None
        }
        KeyCode::Down => {
            app.scroll_down();
            None
        }
        KeyCode::Left => {
            app.scroll_left();
            None
        }
        KeyCode::Right => {
            app.scroll_right();
            None
        }
        _ => None,
    }
}
