//! smelter - binary entry point and terminal session management.
//!
//! Wires [`smelter_session`] (state) to [`smelter_tui`] (rendering) behind an
//! RAII terminal guard, and runs a fixed-cadence loop:
//!
//! 1. Draw the current state
//! 2. Poll for one input event (bounded wait keeps the cadence)
//! 3. Drain completed background work (`app.tick()`)
//!
//! Logs go to a file under the user data directory; writing them to
//! stdout/stderr would corrupt the TUI, so if the file cannot be opened we
//! prefer no logs at all.

use std::fs::OpenOptions;
use std::io::{Stdout, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use smelter_session::{App, Config, CredentialStore, Gateway, SessionStore};

const FRAME_POLL: Duration = Duration::from_millis(33);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(config.log_filter());

    let gateway = Gateway::new(config.base_url());
    tracing::info!(base_url = gateway.base_url(), "Starting smelter");

    let mut session = match CredentialStore::default_location() {
        Some(store) => SessionStore::with_persistence(store),
        None => SessionStore::new(),
    };
    session.resume();

    let mut app = App::new(gateway, session);
    let mut terminal = TerminalSession::new()?;

    loop {
        terminal
            .inner
            .draw(|frame| smelter_tui::draw(frame, &app))
            .context("failed to draw frame")?;

        if event::poll(FRAME_POLL).context("failed to poll input")? {
            match event::read().context("failed to read input")? {
                Event::Key(key) => smelter_tui::handle_key(&mut app, key),
                Event::Paste(text) => app.paste(&text),
                _ => {}
            }
        }

        app.tick();

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

fn init_tracing(default_filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some((path, file)) = open_log_file() else {
        // No usable log file: swallow logs rather than corrupt the TUI.
        tracing_subscriber::registry().with(env_filter).init();
        return;
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(env_filter)
        .init();
    tracing::info!(path = %path.display(), "Logging initialized");
}

fn open_log_file() -> Option<(PathBuf, std::fs::File)> {
    let dir = dirs::data_dir()?.join("smelter");
    std::fs::create_dir_all(&dir).ok()?;
    let path = dir.join("smelter.log");
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;
    Some((path, file))
}

/// Raw-mode terminal with guaranteed restore on drop, panics included.
struct TerminalSession {
    inner: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut out = stdout();
        if let Err(e) = execute!(out, EnterAlternateScreen, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            return Err(e).context("failed to enter alternate screen");
        }
        let inner =
            Terminal::new(CrosstermBackend::new(out)).context("failed to create terminal")?;
        Ok(Self { inner })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::warn!("Failed to disable raw mode: {e}");
        }
        if let Err(e) = execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen) {
            tracing::warn!("Failed to restore terminal screen: {e}");
        }
    }
}
