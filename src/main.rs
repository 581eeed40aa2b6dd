use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{fs::File, io, time::Duration};
use tracing_subscriber::EnvFilter;

mod app;

/// Terminal client for a task board served over HTTP.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Base URL of the task board server
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,
    /// Where diagnostics are written (the TUI owns the terminal)
    #[arg(long, default_value = "task-board.log")]
    log_file: String,
}

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log = File::create(&args.log_file)
        .with_context(|| format!("failed to open log file {}", args.log_file))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(log)
        .with_ansi(false)
        .init();
    tracing::info!(server = %args.server, "task board client starting");

    let api = app::api::ApiClient::new(&args.server)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create an app with a 250 ms tick; the tick sweeps expired notices.
    // The app starts with the initial list call already queued.
    let tick_rate = Duration::from_millis(250);
    let app = app::ui::App::new();
    let res = app::ui::run_app(&mut terminal, app, &api, tick_rate);

    // Restore previous terminal state after exit
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}
